//! `signboard-dashboard` -- headless asset playlist monitor.
//!
//! Loads the asset collection from the signage API, logs the active
//! playlist and the inactive list, and keeps the collection fresh by
//! re-fetching on a fixed interval until stopped.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default                     | Description                     |
//! |-------------------------|----------|-----------------------------|---------------------------------|
//! | `SIGNBOARD_API_URL`     | no       | `http://localhost/api/v2`   | Base URL of the asset API       |
//! | `REQUEST_TIMEOUT_SECS`  | no       | `30`                        | Per-request timeout             |
//! | `REFRESH_INTERVAL_SECS` | no       | `15`                        | Seconds between refresh fetches |

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use signboard_client::{AssetApi, AssetService, ClientConfig};
use signboard_core::collection::AssetCollection;
use signboard_events::{NoticeBus, NoticeLog};
use signboard_sync::SyncEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "signboard_dashboard=info,signboard_sync=info,signboard_client=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        api_url = %config.api_url,
        refresh_interval_secs = config.refresh_interval_secs,
        "Starting signboard-dashboard",
    );

    let api = AssetApi::from_config(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });
    let service: Arc<dyn AssetService> = Arc::new(api);

    // --- Notices ---
    let notices = Arc::new(NoticeBus::default());
    let log_handle = tokio::spawn(NoticeLog::run(notices.subscribe()));

    let engine = SyncEngine::new(service, Arc::clone(&notices));

    match engine.fetch().await {
        Ok(()) => log_playlist(&engine.snapshot()),
        Err(e) => tracing::warn!(error = %e, "Initial fetch failed, will retry"),
    }

    // --- Refresh loop ---
    refresh_until(
        &engine,
        Duration::from_secs(config.refresh_interval_secs),
        shutdown_signal(),
    )
    .await;

    // --- Cleanup ---
    engine.shutdown();

    // Dropping the last bus handle closes the channel and ends the log task.
    drop(engine);
    drop(notices);
    let _ = tokio::time::timeout(Duration::from_secs(5), log_handle).await;

    tracing::info!("Shutdown complete");
}

/// Re-fetch every `period` until `shutdown` resolves.
///
/// An in-flight fetch is abandoned as soon as `shutdown` fires.
async fn refresh_until(engine: &SyncEngine, period: Duration, shutdown: impl Future<Output = ()>) {
    let mut refresh = tokio::time::interval(period);
    refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    refresh.tick().await;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = refresh.tick() => {}
        }

        let before = engine.snapshot();
        tokio::select! {
            () = &mut shutdown => {
                tracing::info!("Abandoning in-flight refresh");
                break;
            }
            result = engine.fetch() => {
                if result.is_ok() {
                    let after = engine.snapshot();
                    if after.items() != before.items() {
                        log_playlist(&after);
                    }
                }
            }
        }
    }
}

/// Log the active playlist in play order, then the inactive assets.
fn log_playlist(collection: &AssetCollection) {
    tracing::info!(
        enabled = collection.enabled_assets().len(),
        disabled = collection.disabled_assets().len(),
        "Collection loaded",
    );
    for asset in collection.enabled_assets() {
        tracing::info!(
            play_order = ?asset.play_order,
            asset_id = %asset.asset_id,
            name = %asset.name,
            kind = ?asset.kind(),
            duration = asset.duration,
            "Active",
        );
    }
    for asset in collection.disabled_assets() {
        tracing::info!(
            asset_id = %asset.asset_id,
            name = %asset.name,
            processing = asset.is_processing,
            "Inactive",
        );
    }
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
