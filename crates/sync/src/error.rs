use signboard_client::AssetApiError;
use signboard_core::error::CoreError;
use signboard_core::types::AssetId;

/// Why a synchronization operation did not complete.
///
/// By the time one of these is returned the failure has already been
/// surfaced (store updated, notice published), so callers may ignore it.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote call failed (network, non-2xx, or malformed body).
    #[error(transparent)]
    Service(#[from] AssetApiError),

    /// The request was rejected locally before any network call.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Asset {0} is not in the collection")]
    UnknownAsset(AssetId),

    #[error("Asset {0} is still processing")]
    Processing(AssetId),

    #[error("Asset {0} already has an operation in flight")]
    RowBusy(AssetId),

    /// The row was unmounted or the engine shut down mid-call.
    #[error("Operation was cancelled")]
    Cancelled,
}
