//! Two-phase delete protocol.
//!
//! Deleting is not locally undoable, so
//! [`SyncEngine::request_delete`](crate::engine::SyncEngine::request_delete)
//! only produces a [`DeleteConfirmation`] to show the user. The network
//! call happens when that confirmation is handed back to
//! [`SyncEngine::confirm_delete`](crate::engine::SyncEngine::confirm_delete).

use signboard_core::types::AssetId;

pub const CONFIRM_TITLE: &str = "Are you sure?";
pub const CONFIRM_TEXT: &str = "This action cannot be undone.";
pub const CONFIRM_LABEL: &str = "Delete";
pub const CANCEL_LABEL: &str = "Cancel";

/// A delete awaiting the user's answer.
#[must_use = "nothing is deleted until the confirmation is passed to `confirm_delete`"]
#[derive(Debug)]
pub struct DeleteConfirmation {
    asset_id: AssetId,
    asset_name: String,
}

impl DeleteConfirmation {
    pub(crate) fn new(asset_id: AssetId, asset_name: String) -> Self {
        Self {
            asset_id,
            asset_name,
        }
    }

    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    /// Display name of the asset, for the prompt.
    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    pub fn title(&self) -> &'static str {
        CONFIRM_TITLE
    }

    pub fn text(&self) -> &'static str {
        CONFIRM_TEXT
    }

    /// The user declined. Nothing is sent.
    pub fn cancel(self) {
        tracing::debug!(asset_id = %self.asset_id, "Delete cancelled by user");
    }

    pub(crate) fn into_asset_id(self) -> AssetId {
        self.asset_id
    }
}
