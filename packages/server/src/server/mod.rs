// HTTP server setup (Axum)
pub mod app;
pub mod error;
pub mod flow_registry;
pub mod routes;

pub use app::*;
pub use error::ApiError;
