//! Notice logging service.
//!
//! [`NoticeLog`] subscribes to the [`NoticeBus`](crate::bus::NoticeBus) and
//! writes every [`Notice`] to `tracing`. It runs as a long-lived background
//! task and exits when the bus sender is dropped.

use tokio::sync::broadcast;

use crate::bus::{Notice, NoticeLevel};

/// Background service that mirrors notices into the log.
pub struct NoticeLog;

impl NoticeLog {
    /// Run the logging loop until the channel closes.
    pub async fn run(mut receiver: broadcast::Receiver<Notice>) {
        loop {
            match receiver.recv().await {
                Ok(notice) => Self::record(&notice),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notice log lagged, some notices were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Notice bus closed, notice log shutting down");
                    break;
                }
            }
        }
    }

    fn record(notice: &Notice) {
        let asset_id = notice.asset_id.as_ref().map(|id| id.as_str()).unwrap_or("-");
        match notice.level {
            NoticeLevel::Success => {
                tracing::info!(asset_id, title = %notice.title, "{}", notice.text);
            }
            NoticeLevel::Error => {
                tracing::warn!(asset_id, title = %notice.title, "{}", notice.text);
            }
        }
    }
}
