use chrono::Duration;

/// Failures of the OTP lifecycle, by kind so callers can render specific guidance
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("A code was sent recently. Please wait {} seconds before requesting another", seconds_ceil(.remaining))]
    CooldownActive { remaining: Duration },

    #[error("No code has been sent to this phone number")]
    NoCodeIssued,

    #[error("The code has expired. Please request a new one")]
    Expired,

    #[error("The code you entered is incorrect")]
    Mismatch,

    #[error("The stored code could not be read. Please request a new one")]
    InvalidStore,

    #[error("Code length must be between 1 and 19 digits (got {0})")]
    InvalidCodeLength(u32),

    #[error("Invalid OTP options: {0}")]
    InvalidOptions(String),

    #[error("Failed to deliver code: {0}")]
    Delivery(#[source] anyhow::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl OtpError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            OtpError::CooldownActive { .. } => "cooldown_active",
            OtpError::NoCodeIssued => "no_code_issued",
            OtpError::Expired => "expired",
            OtpError::Mismatch => "mismatch",
            OtpError::InvalidStore => "invalid_store",
            OtpError::InvalidCodeLength(_) => "invalid_code_length",
            OtpError::InvalidOptions(_) => "invalid_options",
            OtpError::Delivery(_) => "delivery_failed",
            OtpError::Storage(_) => "storage",
        }
    }

    /// Seconds until a resend is allowed, for `CooldownActive`
    pub fn retry_after_seconds(&self) -> Option<i64> {
        match self {
            OtpError::CooldownActive { remaining } => Some(seconds_ceil(remaining)),
            _ => None,
        }
    }
}

/// Whole seconds, rounded up so "0.2s left" still reads as 1
pub fn seconds_ceil(duration: &Duration) -> i64 {
    let millis = duration.num_milliseconds().max(0);
    (millis + 999) / 1000
}
