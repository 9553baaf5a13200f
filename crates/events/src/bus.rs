//! In-process notice bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`NoticeBus`] carries the transient, user-visible [`Notice`]s raised by
//! synchronization operations (e.g. "Deleted!", "Failed to delete asset.").
//! It is designed to be shared via `Arc<NoticeBus>`.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use signboard_core::types::{AssetId, Timestamp};
use tokio::sync::broadcast;

/// How long success notices stay on screen before dismissing themselves.
pub const NOTICE_TIMER: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the user.
///
/// Built with [`Notice::success`] or [`Notice::error`] and enriched with
/// [`for_asset`](Notice::for_asset) and
/// [`with_auto_dismiss`](Notice::with_auto_dismiss).
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,

    /// Short heading, e.g. `"Deleted!"`.
    pub title: String,

    /// Body text, e.g. `"Asset has been deleted."`.
    pub text: String,

    /// Asset the notice is about, if any.
    pub asset_id: Option<AssetId>,

    /// Dismiss automatically after this long; `None` waits for the user.
    pub auto_dismiss: Option<Duration>,

    pub timestamp: Timestamp,
}

impl Notice {
    fn new(level: NoticeLevel, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            text: text.into(),
            asset_id: None,
            auto_dismiss: None,
            timestamp: Utc::now(),
        }
    }

    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, text)
    }

    pub fn error(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, text)
    }

    pub fn for_asset(mut self, asset_id: AssetId) -> Self {
        self.asset_id = Some(asset_id);
        self
    }

    pub fn with_auto_dismiss(mut self, after: Duration) -> Self {
        self.auto_dismiss = Some(after);
        self
    }
}

// ---------------------------------------------------------------------------
// NoticeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out bus for [`Notice`]s.
///
/// # Usage
///
/// ```rust
/// use signboard_events::bus::{Notice, NoticeBus};
///
/// let bus = NoticeBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(Notice::error("Error!", "Failed to delete asset."));
/// ```
pub struct NoticeBus {
    sender: broadcast::Sender<Notice>,
}

impl NoticeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest notices are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notice to all current subscribers.
    ///
    /// With no subscribers the notice is silently dropped.
    pub fn publish(&self, notice: Notice) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(notice);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
