//! Asset collection store.
//!
//! [`AssetStore`] owns the client-side [`AssetCollection`] and is the only
//! place it changes. Every change goes through [`AssetStore::apply`] with a
//! [`CollectionEvent`]; reducers are synchronous and never partially apply.
//!
//! Two update strategies share the store:
//!
//! - *direct patch* ([`CollectionEvent::ToggleFulfilled`],
//!   [`CollectionEvent::AssetAdded`]) edits a single entity in place using
//!   fields echoed by the service;
//! - *structural reconciliation* ([`CollectionEvent::FetchFulfilled`])
//!   replaces the whole sequence with the service's authoritative list. It
//!   is the only path that removes assets or changes global order.
//!
//! Settlements carry a [`RequestSeq`]. A fetch settlement older than the
//! last applied one, or a toggle patch older than the last applied patch
//! for the same asset, is discarded as stale.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::asset::{Asset, EnabledState};
use crate::types::{AssetId, RequestSeq};

/// Lifecycle of the most recent full-collection fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Server-echoed enablement fields for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TogglePatch {
    pub asset_id: AssetId,
    pub is_enabled: bool,
    pub play_order: Option<i64>,
}

impl TogglePatch {
    pub fn new(asset_id: AssetId, state: EnabledState) -> Self {
        Self {
            asset_id,
            is_enabled: state.is_enabled,
            play_order: state.play_order,
        }
    }
}

/// Transition events accepted by [`AssetStore::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent {
    FetchPending,
    FetchFulfilled {
        seq: RequestSeq,
        assets: Vec<Asset>,
    },
    FetchRejected {
        seq: RequestSeq,
        message: String,
    },
    ToggleFulfilled {
        seq: RequestSeq,
        patch: TogglePatch,
    },
    /// A newly created asset echoed by the service. Replaces an existing
    /// entry with the same id in place, otherwise appends.
    AssetAdded(Asset),
}

/// Result of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The collection was updated.
    Changed,
    /// The event was older than state already applied and was dropped.
    Stale,
    /// The event targeted an asset that is not in the collection.
    Missing,
}

/// Ordered, deduplicated assets plus the fetch status envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetCollection {
    items: Vec<Asset>,
    status: FetchStatus,
    error: Option<String>,
}

impl AssetCollection {
    /// Assets in slot order, as last delivered by the service.
    pub fn items(&self) -> &[Asset] {
        &self.items
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Message of the last failed fetch, cleared by the next successful one.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, asset_id: &AssetId) -> Option<&Asset> {
        self.items.iter().find(|asset| &asset.asset_id == asset_id)
    }

    pub fn contains(&self, asset_id: &AssetId) -> bool {
        self.get(asset_id).is_some()
    }

    /// Enabled assets in playback order.
    ///
    /// Sorted by `play_order`; assets without a rank sort last. The sort is
    /// stable, so ties keep slot order.
    pub fn enabled_assets(&self) -> Vec<&Asset> {
        let mut enabled: Vec<&Asset> = self.items.iter().filter(|a| a.is_enabled).collect();
        enabled.sort_by_key(|asset| (asset.play_order.is_none(), asset.play_order));
        enabled
    }

    /// Disabled assets in slot order.
    pub fn disabled_assets(&self) -> Vec<&Asset> {
        self.items.iter().filter(|a| !a.is_enabled).collect()
    }

    /// Identifiers of [`enabled_assets`](Self::enabled_assets), in order.
    pub fn enabled_ids(&self) -> Vec<AssetId> {
        self.enabled_assets()
            .into_iter()
            .map(|asset| asset.asset_id.clone())
            .collect()
    }

    /// Whether enabled ranks form a gap-free `0..n` or `1..=n` sequence.
    pub fn ranking_is_contiguous(&self) -> bool {
        let mut ranks: Vec<i64> = Vec::new();
        for asset in self.items.iter().filter(|a| a.is_enabled) {
            match asset.play_order {
                Some(rank) => ranks.push(rank),
                None => return false,
            }
        }
        ranks.sort_unstable();

        let Some(&first) = ranks.first() else {
            return true;
        };
        (first == 0 || first == 1)
            && ranks
                .iter()
                .enumerate()
                .all(|(offset, &rank)| rank == first + offset as i64)
    }
}

/// Single owner of the [`AssetCollection`] and its transition functions.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    collection: AssetCollection,
    last_fetch_seq: Option<RequestSeq>,
    last_toggle_seq: HashMap<AssetId, RequestSeq>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(&self) -> &AssetCollection {
        &self.collection
    }

    /// Apply one transition event.
    pub fn apply(&mut self, event: CollectionEvent) -> Applied {
        match event {
            CollectionEvent::FetchPending => {
                self.collection.status = FetchStatus::Loading;
                Applied::Changed
            }
            CollectionEvent::FetchFulfilled { seq, assets } => {
                if self.is_stale_fetch(seq) {
                    return Applied::Stale;
                }
                self.last_fetch_seq = Some(seq);
                self.collection.items = dedupe(assets);
                self.collection.status = FetchStatus::Succeeded;
                self.collection.error = None;
                Applied::Changed
            }
            CollectionEvent::FetchRejected { seq, message } => {
                if self.is_stale_fetch(seq) {
                    return Applied::Stale;
                }
                // Keep the last-known-good items visible.
                self.last_fetch_seq = Some(seq);
                self.collection.status = FetchStatus::Failed;
                self.collection.error = Some(message);
                Applied::Changed
            }
            CollectionEvent::ToggleFulfilled { seq, patch } => self.apply_toggle(seq, patch),
            CollectionEvent::AssetAdded(asset) => {
                match self
                    .collection
                    .items
                    .iter_mut()
                    .find(|existing| existing.asset_id == asset.asset_id)
                {
                    Some(existing) => *existing = asset,
                    None => self.collection.items.push(asset),
                }
                Applied::Changed
            }
        }
    }

    fn apply_toggle(&mut self, seq: RequestSeq, patch: TogglePatch) -> Applied {
        if self
            .last_toggle_seq
            .get(&patch.asset_id)
            .is_some_and(|&last| seq <= last)
        {
            return Applied::Stale;
        }

        let Some(asset) = self
            .collection
            .items
            .iter_mut()
            .find(|asset| asset.asset_id == patch.asset_id)
        else {
            return Applied::Missing;
        };

        asset.is_enabled = patch.is_enabled;
        asset.play_order = patch.play_order;
        self.last_toggle_seq.insert(patch.asset_id, seq);
        Applied::Changed
    }

    fn is_stale_fetch(&self, seq: RequestSeq) -> bool {
        self.last_fetch_seq.is_some_and(|last| seq <= last)
    }
}

/// Drop repeated ids, keeping the first occurrence.
fn dedupe(assets: Vec<Asset>) -> Vec<Asset> {
    let mut seen = HashSet::with_capacity(assets.len());
    assets
        .into_iter()
        .filter(|asset| seen.insert(asset.asset_id.clone()))
        .collect()
}
