//! HTTP client for integration testing.
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`, without
//! binding a socket or applying the rate limiter.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use signup_core::kernel::TestDependencies;
use signup_core::server::{build_router, AppState};
use tower::ServiceExt;

/// Result of one request
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub retry_after: Option<String>,
    pub body: Value,
}

impl ApiResponse {
    /// Gets a value at the given JSON path, e.g. `contact.phone` or `attachments.0.size`
    pub fn get(&self, path: &str) -> Value {
        let mut current = &self.body;
        for key in path.split('.') {
            current = match (current, key.parse::<usize>()) {
                (Value::Array(items), Ok(index)) => &items[index],
                _ => &current[key],
            };
        }
        current.clone()
    }
}

pub struct ApiClient {
    router: Router,
    pub state: AppState,
}

impl ApiClient {
    pub fn new(deps: &TestDependencies) -> Self {
        let state = AppState::new(deps.server_deps(), chrono::Duration::hours(1));
        Self {
            router: build_router(state.clone()),
            state,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> ApiResponse {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.execute(request.body(body).expect("valid request")).await
    }

    /// POST raw bytes with the given headers
    pub async fn upload(
        &self,
        uri: &str,
        headers: &[(&str, &str)],
        bytes: Vec<u8>,
    ) -> ApiResponse {
        let mut request = Request::builder().method(Method::POST).uri(uri);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.execute(request.body(Body::from(bytes)).expect("valid request"))
            .await
    }

    async fn execute(&self, request: Request<Body>) -> ApiResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };

        ApiResponse {
            status,
            retry_after,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> ApiResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn put(&self, uri: &str) -> ApiResponse {
        self.send(Method::PUT, uri, None).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::POST, uri, Some(body)).await
    }
}
