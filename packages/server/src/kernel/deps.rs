//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the
//! onboarding flows and the HTTP layer. All external services use trait
//! abstractions to enable testing.

use std::sync::Arc;

use crate::domains::verification::{OtpManager, OtpOptions};
use crate::kernel::{BaseAccountRegistry, BaseClock, BaseOtpTransport, BaseScopedStore};

/// Server dependencies accessible to flows and routes
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseScopedStore>,
    pub clock: Arc<dyn BaseClock>,
    pub account_registry: Arc<dyn BaseAccountRegistry>,
    /// Shared so per-phone locks cover every flow in the process
    pub otp: Arc<OtpManager>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseScopedStore>,
        clock: Arc<dyn BaseClock>,
        otp_transport: Arc<dyn BaseOtpTransport>,
        account_registry: Arc<dyn BaseAccountRegistry>,
        otp_options: OtpOptions,
    ) -> Self {
        let otp = Arc::new(OtpManager::new(
            store.clone(),
            clock.clone(),
            otp_transport,
            otp_options,
        ));
        Self {
            store,
            clock,
            account_registry,
            otp,
        }
    }
}
