use std::sync::{Arc, Mutex};

use axum::Router;

/// Request bodies captured by a test server, in arrival order.
pub type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

/// Serve `routes` under `/api/v2` on an ephemeral local port.
///
/// Returns the base URL to hand to `AssetApi::new`.
pub async fn serve(routes: Router) -> String {
    let app = Router::new().nest("/api/v2", routes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    format!("http://{addr}/api/v2")
}

/// A base URL on which nothing is listening.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{addr}/api/v2")
}

/// A service asset record as the remote returns it.
pub fn asset_json(id: &str, enabled: bool, play_order: Option<i64>) -> serde_json::Value {
    serde_json::json!({
        "asset_id": id,
        "name": format!("Asset {id}"),
        "uri": format!("https://example.com/{id}"),
        "start_date": "2024-06-06T00:59:00+00:00",
        "end_date": "2024-06-13T00:59:00+00:00",
        "duration": "10",
        "mimetype": "webpage",
        "is_enabled": u8::from(enabled),
        "is_processing": 0,
        "nocache": 0,
        "skip_asset_check": 0,
        "play_order": play_order,
    })
}
