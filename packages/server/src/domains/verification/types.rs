//! Verification domain data types

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use typed_builder::TypedBuilder;

use super::{OtpError, MAX_CODE_LENGTH};

/// Issue parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct OtpOptions {
    /// How long an issued code stays valid
    #[builder(default = Duration::minutes(5))]
    pub ttl: Duration,
    /// Minimum interval between issuances for the same phone
    #[builder(default = Duration::seconds(60))]
    pub cooldown: Duration,
    #[builder(default = super::DEFAULT_CODE_LENGTH)]
    pub length: u32,
}

impl Default for OtpOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl OtpOptions {
    pub fn validate(&self) -> Result<(), OtpError> {
        if self.ttl <= Duration::zero() {
            return Err(OtpError::InvalidOptions("ttl must be positive".into()));
        }
        if self.cooldown < Duration::zero() {
            return Err(OtpError::InvalidOptions(
                "cooldown must not be negative".into(),
            ));
        }
        if !(1..=MAX_CODE_LENGTH).contains(&self.length) {
            return Err(OtpError::InvalidCodeLength(self.length));
        }
        Ok(())
    }
}

/// Result of issuing a code.
///
/// Carrying the raw code back to the caller only makes sense while delivery is
/// simulated; it must never leave the process over the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}
