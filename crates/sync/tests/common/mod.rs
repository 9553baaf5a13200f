use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use signboard_client::{AssetApiError, AssetService};
use signboard_core::asset::{Asset, EnabledState, NewAsset};
use signboard_core::types::AssetId;
use signboard_events::NoticeBus;
use signboard_sync::SyncEngine;

/// Remote operations, as recorded by [`FakeRemote::calls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Toggle,
    Delete,
    Reorder,
}

/// How a scripted failure presents itself.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Status(u16),
    Malformed,
}

impl Failure {
    fn into_error(self) -> AssetApiError {
        match self {
            Failure::Status(status) => AssetApiError::ApiError {
                status,
                body: "scripted failure".to_string(),
            },
            Failure::Malformed => AssetApiError::Malformed("scripted malformed body".to_string()),
        }
    }
}

#[derive(Default)]
struct RemoteState {
    assets: Vec<Asset>,
    calls: Vec<Op>,
    failures: HashMap<Op, Failure>,
    stalled: HashSet<Op>,
    stalled_after: HashSet<Op>,
    next_list: Option<Vec<Asset>>,
    next_toggle: Option<EnabledState>,
    created: u32,
}

/// In-memory stand-in for the remote asset service.
///
/// Keeps the service's ordering rules: enabling appends to the end of
/// the ranking, disabling and deleting compact it, and reordering ranks
/// the submitted ids first.
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<RemoteState>,
}

impl FakeRemote {
    pub fn with_assets(assets: Vec<Asset>) -> Arc<Self> {
        let remote = Self::default();
        remote.state.lock().unwrap().assets = assets;
        Arc::new(remote)
    }

    /// Make the next call of `op` fail.
    pub fn fail_next(&self, op: Op, failure: Failure) {
        self.state.lock().unwrap().failures.insert(op, failure);
    }

    /// Make every call of `op` hang until cancelled.
    pub fn stall(&self, op: Op) {
        self.state.lock().unwrap().stalled.insert(op);
    }

    /// Apply every call of `op`, then hang until cancelled.
    pub fn stall_after_apply(&self, op: Op) {
        self.state.lock().unwrap().stalled_after.insert(op);
    }

    /// Answer the next list call with `assets` instead of the stored state.
    pub fn script_next_list(&self, assets: Vec<Asset>) {
        self.state.lock().unwrap().next_list = Some(assets);
    }

    /// Answer the next toggle with `state` instead of applying ranking rules.
    pub fn script_next_toggle(&self, state: EnabledState) {
        self.state.lock().unwrap().next_toggle = Some(state);
    }

    pub fn calls(&self) -> Vec<Op> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|&&call| call == op).count()
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.state.lock().unwrap().assets.clone()
    }

    /// Record the call and decide whether it fails or stalls.
    async fn enter(&self, op: Op) -> Result<(), AssetApiError> {
        let (failure, stalled) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(op);
            (state.failures.remove(&op), state.stalled.contains(&op))
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;
        match failure {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    /// Hang after the mutation if `op` is set to stall after applying.
    async fn settle(&self, op: Op) {
        let stalled = self.state.lock().unwrap().stalled_after.contains(&op);
        if stalled {
            std::future::pending::<()>().await;
        }
    }
}

fn not_found(asset_id: &AssetId) -> AssetApiError {
    AssetApiError::ApiError {
        status: 404,
        body: format!("Asset {asset_id} not found"),
    }
}

/// Reassign ranks 0..n to `ranking` and clear ranks of everything else.
fn save_ordering(assets: &mut [Asset], ranking: &[AssetId]) {
    for asset in assets.iter_mut() {
        asset.play_order = ranking
            .iter()
            .position(|id| id == &asset.asset_id)
            .map(|rank| rank as i64);
    }
}

fn current_ranking(assets: &[Asset]) -> Vec<AssetId> {
    let mut enabled: Vec<&Asset> = assets.iter().filter(|a| a.is_enabled).collect();
    enabled.sort_by_key(|a| (a.play_order.is_none(), a.play_order));
    enabled.into_iter().map(|a| a.asset_id.clone()).collect()
}

#[async_trait]
impl AssetService for FakeRemote {
    async fn list_assets(&self) -> Result<Vec<Asset>, AssetApiError> {
        self.enter(Op::List).await?;
        let mut state = self.state.lock().unwrap();
        Ok(state.next_list.take().unwrap_or_else(|| state.assets.clone()))
    }

    async fn create_asset(&self, new_asset: &NewAsset) -> Result<Asset, AssetApiError> {
        self.enter(Op::Create).await?;
        let mut state = self.state.lock().unwrap();
        state.created += 1;

        let asset = Asset {
            asset_id: AssetId::new(format!("created-{}", state.created)),
            name: new_asset.name.clone(),
            uri: Some(new_asset.uri.clone()),
            start_date: new_asset.start_date,
            end_date: new_asset.end_date,
            duration: new_asset.duration,
            mimetype: new_asset.mimetype.clone(),
            is_enabled: new_asset.is_enabled,
            is_processing: false,
            nocache: new_asset.nocache,
            skip_asset_check: new_asset.skip_asset_check,
            play_order: None,
        };
        let mut ranking = current_ranking(&state.assets);
        if asset.is_enabled {
            ranking.push(asset.asset_id.clone());
        }
        state.assets.push(asset.clone());
        save_ordering(&mut state.assets, &ranking);

        let id = asset.asset_id;
        Ok(state
            .assets
            .iter()
            .find(|a| a.asset_id == id)
            .cloned()
            .expect("created asset is stored"))
    }

    async fn set_enabled(
        &self,
        asset_id: &AssetId,
        enabled: bool,
    ) -> Result<EnabledState, AssetApiError> {
        self.enter(Op::Toggle).await?;
        let echoed = {
            let mut state = self.state.lock().unwrap();
            if let Some(scripted) = state.next_toggle.take() {
                return Ok(scripted);
            }

            let mut ranking = current_ranking(&state.assets);
            let asset = state
                .assets
                .iter_mut()
                .find(|a| &a.asset_id == asset_id)
                .ok_or_else(|| not_found(asset_id))?;
            asset.is_enabled = enabled;

            ranking.retain(|id| id != asset_id);
            if enabled {
                ranking.push(asset_id.clone());
            }
            save_ordering(&mut state.assets, &ranking);

            let asset = state
                .assets
                .iter()
                .find(|a| &a.asset_id == asset_id)
                .expect("toggled asset is stored");
            EnabledState {
                is_enabled: asset.is_enabled,
                play_order: asset.play_order,
            }
        };
        self.settle(Op::Toggle).await;
        Ok(echoed)
    }

    async fn delete_asset(&self, asset_id: &AssetId) -> Result<(), AssetApiError> {
        self.enter(Op::Delete).await?;
        {
            let mut state = self.state.lock().unwrap();
            let before = state.assets.len();
            state.assets.retain(|a| &a.asset_id != asset_id);
            if state.assets.len() == before {
                return Err(not_found(asset_id));
            }
            let ranking = current_ranking(&state.assets);
            save_ordering(&mut state.assets, &ranking);
        }
        self.settle(Op::Delete).await;
        Ok(())
    }

    async fn reorder(&self, ids: &[AssetId]) -> Result<(), AssetApiError> {
        self.enter(Op::Reorder).await?;
        let mut state = self.state.lock().unwrap();
        let current = current_ranking(&state.assets);

        let mut ranking: Vec<AssetId> = ids
            .iter()
            .filter(|id| current.contains(id))
            .cloned()
            .collect();
        for id in current {
            if !ranking.contains(&id) {
                ranking.push(id);
            }
        }
        save_ordering(&mut state.assets, &ranking);
        Ok(())
    }
}

pub fn asset(id: &str, enabled: bool, play_order: Option<i64>) -> Asset {
    Asset {
        asset_id: AssetId::from(id),
        name: format!("Asset {id}"),
        uri: Some(format!("https://example.com/{id}")),
        start_date: None,
        end_date: None,
        duration: 10,
        mimetype: "webpage".to_string(),
        is_enabled: enabled,
        is_processing: false,
        nocache: false,
        skip_asset_check: false,
        play_order,
    }
}

/// An engine over `remote` plus its notice bus.
pub fn engine(remote: &Arc<FakeRemote>) -> (SyncEngine, Arc<NoticeBus>) {
    let notices = Arc::new(NoticeBus::default());
    let service: Arc<dyn AssetService> = Arc::clone(remote) as Arc<dyn AssetService>;
    (SyncEngine::new(service, Arc::clone(&notices)), notices)
}

/// An engine whose collection has already been fetched from `remote`.
pub async fn loaded_engine(remote: &Arc<FakeRemote>) -> (SyncEngine, Arc<NoticeBus>) {
    let (engine, notices) = engine(remote);
    engine.fetch().await.expect("initial fetch should succeed");
    (engine, notices)
}

/// Poll `condition` until it holds, failing the test after one second.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition should become true");
}

/// `(id, is_enabled, play_order)` triples, for compact assertions.
pub fn summary(assets: &[Asset]) -> Vec<(String, bool, Option<i64>)> {
    assets
        .iter()
        .map(|a| (a.asset_id.to_string(), a.is_enabled, a.play_order))
        .collect()
}
