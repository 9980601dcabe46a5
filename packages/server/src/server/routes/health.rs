use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    store: StoreHealth,
    mounted_flows: usize,
}

#[derive(Serialize)]
pub struct StoreHealth {
    backend: &'static str,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Checks the scoped store backend is reachable (5s timeout).
///
/// Returns 200 OK if all systems are healthy, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store = state.deps.store.as_ref();
    let store_health = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        store.health_check(),
    )
    .await
    {
        Ok(Ok(())) => StoreHealth {
            backend: store.backend(),
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => StoreHealth {
            backend: store.backend(),
            status: "error".to_string(),
            error: Some(format!("Check failed: {}", e)),
        },
        Err(_) => StoreHealth {
            backend: store.backend(),
            status: "error".to_string(),
            error: Some("Check timeout (>5s)".to_string()),
        },
    };

    let is_healthy = store_health.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            store: store_health,
            mounted_flows: state.flows.len(),
        }),
    )
}
