//! Seam between the synchronization engine and the remote asset service.

use async_trait::async_trait;
use signboard_core::asset::{Asset, EnabledState, NewAsset};
use signboard_core::types::AssetId;

use crate::api::{AssetApi, AssetApiError};

/// The mutating and listing operations the engine needs from the service.
///
/// [`AssetApi`] is the HTTP implementation; tests substitute an in-memory
/// remote.
#[async_trait]
pub trait AssetService: Send + Sync {
    async fn list_assets(&self) -> Result<Vec<Asset>, AssetApiError>;

    async fn create_asset(&self, asset: &NewAsset) -> Result<Asset, AssetApiError>;

    async fn set_enabled(
        &self,
        asset_id: &AssetId,
        enabled: bool,
    ) -> Result<EnabledState, AssetApiError>;

    async fn delete_asset(&self, asset_id: &AssetId) -> Result<(), AssetApiError>;

    async fn reorder(&self, ids: &[AssetId]) -> Result<(), AssetApiError>;
}

#[async_trait]
impl AssetService for AssetApi {
    async fn list_assets(&self) -> Result<Vec<Asset>, AssetApiError> {
        AssetApi::list_assets(self).await
    }

    async fn create_asset(&self, asset: &NewAsset) -> Result<Asset, AssetApiError> {
        AssetApi::create_asset(self, asset).await
    }

    async fn set_enabled(
        &self,
        asset_id: &AssetId,
        enabled: bool,
    ) -> Result<EnabledState, AssetApiError> {
        AssetApi::set_enabled(self, asset_id, enabled).await
    }

    async fn delete_asset(&self, asset_id: &AssetId) -> Result<(), AssetApiError> {
        AssetApi::delete_asset(self, asset_id).await
    }

    async fn reorder(&self, ids: &[AssetId]) -> Result<(), AssetApiError> {
        AssetApi::reorder(self, ids).await
    }
}
