//! REST client for the remote asset service.
//!
//! Wraps the asset endpoints (list, create, toggle, delete, reorder) plus
//! the device-settings and content lookups using [`reqwest`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use signboard_core::asset::{Asset, EnabledState, NewAsset};
use signboard_core::content::AssetContent;
use signboard_core::settings::DeviceSettings;
use signboard_core::types::AssetId;

use crate::config::ClientConfig;

/// HTTP client for one remote asset service.
#[derive(Debug, Clone)]
pub struct AssetApi {
    client: reqwest::Client,
    api_url: String,
}

/// Failure classes of a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request could not be sent or no response arrived.
    NetworkFailure,
    /// The service answered with a non-2xx status.
    ServerRejection,
    /// A 2xx response whose body could not be understood.
    MalformedResponse,
}

/// Errors from the asset service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum AssetApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Asset service error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A success response carried a body that does not match the contract.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl AssetApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Request(_) => FailureKind::NetworkFailure,
            Self::ApiError { .. } => FailureKind::ServerRejection,
            Self::Malformed(_) => FailureKind::MalformedResponse,
        }
    }
}

impl AssetApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://host/api/v2`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Build a client with the configured base URL and request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AssetApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// List all assets.
    ///
    /// Sends `GET /assets`. The service returns them in its authoritative
    /// order with `play_order` already assigned.
    pub async fn list_assets(&self) -> Result<Vec<Asset>, AssetApiError> {
        let response = self
            .client
            .get(format!("{}/assets", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Create an asset.
    ///
    /// Sends `POST /assets` and returns the created record.
    pub async fn create_asset(&self, asset: &NewAsset) -> Result<Asset, AssetApiError> {
        let response = self
            .client
            .post(format!("{}/assets", self.api_url))
            .json(asset)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Enable or disable an asset.
    ///
    /// Sends `PATCH /assets/{id}` with `{"is_enabled": 0|1}`. The service
    /// answers with the new flag and the `play_order` it assigned.
    pub async fn set_enabled(
        &self,
        asset_id: &AssetId,
        enabled: bool,
    ) -> Result<EnabledState, AssetApiError> {
        let body = serde_json::json!({
            "is_enabled": u8::from(enabled),
        });

        let response = self
            .client
            .patch(format!("{}/assets/{}", self.api_url, asset_id))
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Delete an asset.
    ///
    /// Sends `DELETE /assets/{id}`. Any 2xx (usually 204) is success.
    pub async fn delete_asset(&self, asset_id: &AssetId) -> Result<(), AssetApiError> {
        let response = self
            .client
            .delete(format!("{}/assets/{}", self.api_url, asset_id))
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Submit a new playlist order.
    ///
    /// Sends `POST /assets/order` with the ids comma-joined in the `ids`
    /// field. The service assigns the resulting ranks.
    pub async fn reorder(&self, ids: &[AssetId]) -> Result<(), AssetApiError> {
        let joined = ids
            .iter()
            .map(AssetId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let body = serde_json::json!({ "ids": joined });

        let response = self
            .client
            .post(format!("{}/assets/order", self.api_url))
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Fetch device display settings via `GET /device_settings`.
    pub async fn device_settings(&self) -> Result<DeviceSettings, AssetApiError> {
        let response = self
            .client
            .get(format!("{}/device_settings", self.api_url))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch device settings, falling back to the defaults on any failure.
    pub async fn device_settings_or_default(&self) -> DeviceSettings {
        match self.device_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load device settings, using defaults");
                DeviceSettings::default()
            }
        }
    }

    /// Fetch where an asset's content lives via `GET /assets/{id}/content`.
    pub async fn asset_content(&self, asset_id: &AssetId) -> Result<AssetContent, AssetApiError> {
        let response = self
            .client
            .get(format!("{}/assets/{}/content", self.api_url, asset_id))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`AssetApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AssetApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AssetApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    ///
    /// Decoding failures are reported as [`AssetApiError::Malformed`] so a
    /// partially understood body is never applied.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AssetApiError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| AssetApiError::Malformed(e.to_string()))
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), AssetApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
