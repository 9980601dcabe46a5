//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::common::FlowId;
use crate::config::Config;
use crate::kernel::ServerDeps;
use crate::server::error::ApiError;
use crate::server::flow_registry::FlowRegistry;
use crate::server::routes::{
    advance_flow, attach_file, back_flow, get_flow, health_handler, mount_flow, resend_code,
    update_contact_fields, update_job_fields,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub flows: Arc<FlowRegistry>,
}

impl AppState {
    /// Mounted flows untouched for `flow_idle_ttl` are evicted
    pub fn new(deps: Arc<ServerDeps>, flow_idle_ttl: chrono::Duration) -> Self {
        let flows = FlowRegistry::new(deps.clock.clone(), flow_idle_ttl);
        Self {
            deps,
            flows: Arc::new(flows),
        }
    }

    /// A mounted flow, or 404
    pub fn flow(
        &self,
        flow_id: FlowId,
    ) -> Result<Arc<tokio::sync::Mutex<crate::domains::onboarding::WizardFlow>>, ApiError> {
        self.flows
            .get(flow_id)
            .ok_or(ApiError::FlowNotFound(flow_id))
    }
}

/// Routes and shared state, without the network-facing layers
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/flows/:flow_id", put(mount_flow).get(get_flow))
        .route("/api/flows/:flow_id/job", patch(update_job_fields))
        .route("/api/flows/:flow_id/attachments", post(attach_file))
        .route("/api/flows/:flow_id/contact", patch(update_contact_fields))
        .route("/api/flows/:flow_id/advance", post(advance_flow))
        .route("/api/flows/:flow_id/back", post(back_flow))
        .route("/api/flows/:flow_id/resend", post(resend_code))
        .route("/health", get(health_handler))
        .layer(Extension(state))
}

/// Build the Axum application router with CORS, tracing and per-IP rate limiting
pub fn build_app(state: AppState, config: &Config) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&config.allowed_origins)?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
        .allow_headers([CONTENT_TYPE]);

    // Rate limiting keyed by the peer IP; use_headers() adds x-ratelimit-* response headers
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .use_headers()
            .finish()
            .context("Invalid rate limit configuration")?,
    );
    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    // Middleware layers (applied in reverse order - last added runs first)
    Ok(build_router(state)
        .layer(rate_limit_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

fn allowed_origins(origins: &[String]) -> Result<AllowOrigin> {
    if origins.is_empty() {
        return Ok(AllowOrigin::from(Any));
    }

    let values = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid origin in ALLOWED_ORIGINS: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AllowOrigin::list(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_origin_list_allows_any() {
        assert!(allowed_origins(&[]).is_ok());
    }

    #[test]
    fn malformed_origin_is_rejected() {
        assert!(allowed_origins(&["bad\norigin".to_string()]).is_err());
    }
}
