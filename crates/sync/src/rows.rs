//! Per-row busy flags.
//!
//! A row holds at most one in-flight operation. [`RowLocks::acquire`] hands
//! out a [`RowGuard`] that marks the row busy until it is dropped and
//! carries a [`CancellationToken`] (child of the engine's root token) so the
//! row's operation can be aborted when the row goes away.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use signboard_client::AssetApiError;
use signboard_core::types::AssetId;
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;

/// Busy rows indexed by asset id.
pub struct RowLocks {
    root: CancellationToken,
    rows: Mutex<HashMap<AssetId, CancellationToken>>,
}

impl RowLocks {
    pub fn new(root: CancellationToken) -> Self {
        Self {
            root,
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Mark a row busy.
    ///
    /// Fails with [`SyncError::RowBusy`] if the row already has an
    /// operation in flight, or [`SyncError::Cancelled`] after shutdown.
    pub fn acquire(self: &Arc<Self>, asset_id: &AssetId) -> Result<RowGuard, SyncError> {
        if self.root.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let mut rows = self.rows();
        if rows.contains_key(asset_id) {
            return Err(SyncError::RowBusy(asset_id.clone()));
        }
        let token = self.root.child_token();
        rows.insert(asset_id.clone(), token.clone());

        Ok(RowGuard {
            locks: Arc::clone(self),
            asset_id: asset_id.clone(),
            token,
        })
    }

    pub fn is_busy(&self, asset_id: &AssetId) -> bool {
        self.rows().contains_key(asset_id)
    }

    pub fn busy_rows(&self) -> Vec<AssetId> {
        self.rows().keys().cloned().collect()
    }

    /// Abort the row's in-flight operation. Returns `false` if the row was idle.
    pub fn cancel(&self, asset_id: &AssetId) -> bool {
        match self.rows().get(asset_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn rows(&self) -> MutexGuard<'_, HashMap<AssetId, CancellationToken>> {
        // The map is left consistent by every critical section.
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held for the duration of one row operation.
pub struct RowGuard {
    locks: Arc<RowLocks>,
    asset_id: AssetId,
    token: CancellationToken,
}

impl RowGuard {
    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    /// Drive a remote call unless the row is cancelled first.
    pub async fn run<T, F>(&self, call: F) -> Result<T, SyncError>
    where
        F: Future<Output = Result<T, AssetApiError>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(SyncError::Cancelled),
            result = call => result.map_err(SyncError::from),
        }
    }
}

impl Drop for RowGuard {
    fn drop(&mut self) {
        self.locks.rows().remove(&self.asset_id);
    }
}
