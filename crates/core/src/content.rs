//! Asset content descriptor returned by `GET /assets/{id}/content`.

use serde::{Deserialize, Serialize};

/// Where an asset's content can be obtained.
///
/// File payloads stay base64-encoded; decoding belongs to the download
/// helper, not to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetContent {
    Url {
        url: String,
    },
    File {
        /// Base64-encoded file bytes.
        content: String,
        #[serde(default)]
        mimetype: Option<String>,
        #[serde(default)]
        filename: Option<String>,
    },
}
