//! Stand-in OTP transport.
//!
//! There is no SMS provider behind this service; dispatches are written to the
//! log so developers can read the code during local runs.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::BaseOtpTransport;
use crate::common::hash_identifier;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingOtpTransport;

#[async_trait]
impl BaseOtpTransport for LoggingOtpTransport {
    async fn send(&self, phone_number: &str, code: &str) -> Result<()> {
        info!(
            phone_key = %hash_identifier(phone_number),
            code = %code,
            "OTP dispatched (logging transport, no SMS sent)"
        );
        Ok(())
    }
}
