//! Client-side view of a playlist reorder gesture.
//!
//! The client never assigns `play_order`. A [`ReorderDraft`] only holds the
//! relative order of asset ids produced by a drag gesture; the service
//! assigns ranks when the draft is submitted.

use std::collections::HashSet;

use crate::collection::AssetCollection;
use crate::error::CoreError;
use crate::types::AssetId;

/// Working order of the drag surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderDraft {
    ids: Vec<AssetId>,
}

impl ReorderDraft {
    /// Start from the collection's current enabled order.
    pub fn from_collection(collection: &AssetCollection) -> Self {
        Self {
            ids: collection.enabled_ids(),
        }
    }

    pub fn ids(&self) -> &[AssetId] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<AssetId> {
        self.ids
    }

    /// Move the entry at `from` to position `to`, shifting the entries in
    /// between. Out-of-range positions are rejected.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        let len = self.ids.len();
        if from >= len || to >= len {
            return Err(CoreError::Validation(format!(
                "Cannot move position {from} to {to} in a playlist of {len}"
            )));
        }
        let id = self.ids.remove(from);
        self.ids.insert(to, id);
        Ok(())
    }

    /// Discard the gesture and return to the last fetched order.
    pub fn revert(&mut self, collection: &AssetCollection) {
        self.ids = collection.enabled_ids();
    }
}

/// Check a reorder submission against the collection before it is sent.
///
/// Every id must be known and unique, and no asset may be mid-ingestion.
pub fn validate_reorder(collection: &AssetCollection, ids: &[AssetId]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!(
                "Asset '{id}' appears more than once in the new order"
            )));
        }
        let asset = collection.get(id).ok_or_else(|| CoreError::NotFound {
            entity: "asset",
            id: id.clone(),
        })?;
        if asset.is_processing {
            return Err(CoreError::Validation(format!(
                "Asset '{id}' is still processing and cannot be reordered"
            )));
        }
    }
    Ok(())
}
