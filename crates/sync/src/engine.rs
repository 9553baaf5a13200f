//! Synchronization engine.
//!
//! [`SyncEngine`] owns the [`AssetStore`] and runs every operation that
//! changes it: fetch, toggle-enabled, delete, reorder and create. Each
//! operation is one asynchronous call against the [`AssetService`]; its
//! result is applied to the store synchronously once it settles.
//!
//! Toggle and create patch the affected asset directly from the service's
//! echo and then reconcile with a full fetch. Delete and reorder never
//! patch; they reconcile only, so the client never derives `play_order`.
//!
//! The store lives in a [`watch`] channel. Call [`SyncEngine::subscribe`]
//! to be woken on every applied change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use signboard_client::AssetService;
use signboard_core::asset::NewAsset;
use signboard_core::collection::{
    Applied, AssetCollection, AssetStore, CollectionEvent, TogglePatch,
};
use signboard_core::ordering::validate_reorder;
use signboard_core::types::{AssetId, RequestSeq};
use signboard_events::{Notice, NoticeBus, NOTICE_TIMER};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::confirm::DeleteConfirmation;
use crate::error::SyncError;
use crate::rows::RowLocks;

const ERROR_TITLE: &str = "Error!";

/// Shared handle to the collection and its operations.
///
/// Cheap to clone; clones drive the same store.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

struct Inner {
    service: Arc<dyn AssetService>,
    store: watch::Sender<AssetStore>,
    notices: Arc<NoticeBus>,
    rows: Arc<RowLocks>,
    next_seq: AtomicU64,
    /// Root token; cancelled by [`SyncEngine::shutdown`].
    cancel: CancellationToken,
}

impl SyncEngine {
    /// Create an engine with an empty, idle collection.
    pub fn new(service: Arc<dyn AssetService>, notices: Arc<NoticeBus>) -> Self {
        let (store, _) = watch::channel(AssetStore::new());
        let cancel = CancellationToken::new();
        let rows = Arc::new(RowLocks::new(cancel.clone()));

        Self {
            inner: Arc::new(Inner {
                service,
                store,
                notices,
                rows,
                next_seq: AtomicU64::new(0),
                cancel,
            }),
        }
    }

    /// Subscribe to store changes. Receivers read the collection through
    /// [`AssetStore::collection`].
    pub fn subscribe(&self) -> watch::Receiver<AssetStore> {
        self.inner.store.subscribe()
    }

    /// Clone of the current collection.
    pub fn snapshot(&self) -> AssetCollection {
        self.inner.store.borrow().collection().clone()
    }

    pub fn notices(&self) -> &Arc<NoticeBus> {
        &self.inner.notices
    }

    /// Whether the row has an operation in flight.
    pub fn is_busy(&self, asset_id: &AssetId) -> bool {
        self.inner.rows.is_busy(asset_id)
    }

    pub fn busy_rows(&self) -> Vec<AssetId> {
        self.inner.rows.busy_rows()
    }

    /// Abort the row's in-flight operation, e.g. when the row unmounts.
    ///
    /// The operation resolves as [`SyncError::Cancelled`] without patching
    /// the store, then reconciles with a full fetch in case the service
    /// applied the request before the cancellation.
    pub fn cancel_row(&self, asset_id: &AssetId) -> bool {
        self.inner.rows.cancel(asset_id)
    }

    /// Cancel every in-flight row, reorder and create operation and refuse
    /// new ones.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down sync engine");
        self.inner.cancel.cancel();
    }

    // -----------------------------------------------------------------------
    // Fetch (structural reconciliation)
    // -----------------------------------------------------------------------

    /// Replace the collection with the service's authoritative list.
    ///
    /// On failure the previous items stay visible; `status` becomes
    /// `failed` and `error` carries the message.
    pub async fn fetch(&self) -> Result<(), SyncError> {
        let seq = self.next_seq();
        self.apply(CollectionEvent::FetchPending);
        tracing::debug!(seq, "Fetching assets");

        match self.inner.service.list_assets().await {
            Ok(assets) => {
                let received = assets.len();
                if self.apply(CollectionEvent::FetchFulfilled { seq, assets }) == Applied::Stale {
                    tracing::debug!(seq, "Discarded stale fetch result");
                    return Ok(());
                }

                let collection = self.snapshot();
                if collection.len() != received {
                    tracing::warn!(
                        received,
                        kept = collection.len(),
                        "Service returned duplicate asset ids",
                    );
                }
                if !collection.ranking_is_contiguous() {
                    tracing::warn!("Service returned a non-contiguous play order");
                }
                tracing::info!(count = collection.len(), "Assets fetched");
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                if self.apply(CollectionEvent::FetchRejected { seq, message }) == Applied::Stale {
                    tracing::debug!(seq, "Discarded stale fetch failure");
                } else {
                    tracing::warn!(error = %e, "Failed to fetch assets");
                }
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Toggle (direct patch + reconciliation)
    // -----------------------------------------------------------------------

    /// Enable or disable an asset.
    ///
    /// Nothing is committed before the service answers. On success the
    /// echoed `is_enabled`/`play_order` are patched onto the asset and a
    /// full fetch follows, since other assets' ranks may have been
    /// compacted. On failure the asset is left exactly as it was.
    pub async fn toggle_enabled(
        &self,
        asset_id: &AssetId,
        enabled: bool,
    ) -> Result<TogglePatch, SyncError> {
        {
            let store = self.inner.store.borrow();
            let asset = store
                .collection()
                .get(asset_id)
                .ok_or_else(|| SyncError::UnknownAsset(asset_id.clone()))?;
            if asset.is_processing {
                tracing::warn!(asset_id = %asset_id, "Refusing to toggle a processing asset");
                return Err(SyncError::Processing(asset_id.clone()));
            }
        }

        let guard = self.inner.rows.acquire(asset_id)?;
        let seq = self.next_seq();

        let state = match guard
            .run(self.inner.service.set_enabled(asset_id, enabled))
            .await
        {
            Ok(state) => state,
            Err(e) => {
                self.report_failure(asset_id, &e, "Failed to update asset.");
                drop(guard);
                self.reconcile_after_cancel(&e).await;
                return Err(e);
            }
        };

        let patch = TogglePatch::new(asset_id.clone(), state);
        match self.apply(CollectionEvent::ToggleFulfilled {
            seq,
            patch: patch.clone(),
        }) {
            Applied::Changed => tracing::info!(
                asset_id = %asset_id,
                is_enabled = patch.is_enabled,
                play_order = ?patch.play_order,
                "Asset toggled",
            ),
            Applied::Stale => tracing::debug!(asset_id = %asset_id, seq, "Discarded stale toggle"),
            Applied::Missing => {
                tracing::debug!(asset_id = %asset_id, "Toggled asset left the collection")
            }
        }
        drop(guard);

        // Reconciliation failures are recorded in the store's status.
        let _ = self.fetch().await;
        Ok(patch)
    }

    // -----------------------------------------------------------------------
    // Delete (confirmation + reconciliation)
    // -----------------------------------------------------------------------

    /// First phase of a delete: produce the confirmation to show the user.
    ///
    /// No network call is made.
    pub fn request_delete(&self, asset_id: &AssetId) -> Result<DeleteConfirmation, SyncError> {
        let store = self.inner.store.borrow();
        let asset = store
            .collection()
            .get(asset_id)
            .ok_or_else(|| SyncError::UnknownAsset(asset_id.clone()))?;
        if self.is_busy(asset_id) {
            return Err(SyncError::RowBusy(asset_id.clone()));
        }
        Ok(DeleteConfirmation::new(asset_id.clone(), asset.name.clone()))
    }

    /// Second phase of a delete: the user confirmed.
    ///
    /// The row stays busy until the asset is gone from the collection. On
    /// success a full fetch removes it and picks up compacted ranks. On a
    /// remote failure the collection is untouched and no fetch is made; a
    /// cancelled delete re-fetches, since the service may have completed it.
    pub async fn confirm_delete(&self, confirmation: DeleteConfirmation) -> Result<(), SyncError> {
        let asset_id = confirmation.into_asset_id();
        let guard = self.inner.rows.acquire(&asset_id)?;

        if let Err(e) = guard
            .run(self.inner.service.delete_asset(&asset_id))
            .await
        {
            self.report_failure(&asset_id, &e, "Failed to delete asset.");
            drop(guard);
            self.reconcile_after_cancel(&e).await;
            return Err(e);
        }

        tracing::info!(asset_id = %asset_id, "Asset deleted");
        self.inner.notices.publish(
            Notice::success("Deleted!", "Asset has been deleted.")
                .for_asset(asset_id.clone())
                .with_auto_dismiss(NOTICE_TIMER),
        );

        let _ = self.fetch().await;
        drop(guard);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reorder (reconciliation only)
    // -----------------------------------------------------------------------

    /// Submit a new relative order for a set of assets.
    ///
    /// The service assigns the resulting ranks; a fetch adopts them. On
    /// failure nothing was reordered locally, so the drag surface reverts
    /// by re-reading the collection's enabled order.
    pub async fn reorder(&self, ids: Vec<AssetId>) -> Result<(), SyncError> {
        validate_reorder(self.inner.store.borrow().collection(), &ids)?;

        let cancel = self.inner.cancel.child_token();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SyncError::Cancelled),
            result = self.inner.service.reorder(&ids) => result.map_err(SyncError::from),
        };

        if let Err(e) = result {
            if !matches!(e, SyncError::Cancelled) {
                tracing::warn!(error = %e, count = ids.len(), "Failed to reorder assets");
                self.inner
                    .notices
                    .publish(Notice::error(ERROR_TITLE, "Failed to update playlist order."));
            }
            return Err(e);
        }

        tracing::info!(count = ids.len(), "Playlist order submitted");
        let _ = self.fetch().await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Create (direct patch + reconciliation)
    // -----------------------------------------------------------------------

    /// Create an asset and adopt the service's ordering for it.
    pub async fn create(&self, asset: NewAsset) -> Result<AssetId, SyncError> {
        let cancel = self.inner.cancel.child_token();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SyncError::Cancelled),
            result = self.inner.service.create_asset(&asset) => result.map_err(SyncError::from),
        };

        let created = match result {
            Ok(created) => created,
            Err(e) => {
                if !matches!(e, SyncError::Cancelled) {
                    tracing::warn!(error = %e, name = %asset.name, "Failed to create asset");
                    self.inner
                        .notices
                        .publish(Notice::error(ERROR_TITLE, "Failed to add asset."));
                }
                return Err(e);
            }
        };

        let asset_id = created.asset_id.clone();
        self.apply(CollectionEvent::AssetAdded(created));
        tracing::info!(asset_id = %asset_id, "Asset created");
        self.inner.notices.publish(
            Notice::success("Added!", "Asset has been added.")
                .for_asset(asset_id.clone())
                .with_auto_dismiss(NOTICE_TIMER),
        );

        let _ = self.fetch().await;
        Ok(asset_id)
    }

    // ---- private helpers ----

    fn next_seq(&self) -> RequestSeq {
        self.inner.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Apply one event, waking subscribers only if the store changed.
    fn apply(&self, event: CollectionEvent) -> Applied {
        let mut outcome = Applied::Stale;
        self.inner.store.send_if_modified(|store| {
            outcome = store.apply(event);
            outcome == Applied::Changed
        });
        outcome
    }

    /// Re-fetch after a cancelled row operation.
    ///
    /// Cancelling drops only the local future; the service may already have
    /// applied the request. Skipped once the engine is shut down.
    async fn reconcile_after_cancel(&self, error: &SyncError) {
        if !matches!(error, SyncError::Cancelled) || self.inner.cancel.is_cancelled() {
            return;
        }
        tracing::debug!("Reconciling after cancelled row operation");
        let _ = self.fetch().await;
    }

    /// Log a failed row operation and tell the user, unless it was cancelled.
    fn report_failure(&self, asset_id: &AssetId, error: &SyncError, text: &str) {
        if matches!(error, SyncError::Cancelled) {
            tracing::debug!(asset_id = %asset_id, "Row operation cancelled");
            return;
        }
        tracing::warn!(asset_id = %asset_id, error = %error, "{text}");
        self.inner
            .notices
            .publish(Notice::error(ERROR_TITLE, text).for_asset(asset_id.clone()));
    }
}
