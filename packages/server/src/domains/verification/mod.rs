//! Verification domain - proves control of a phone number with one-time passcodes
//!
//! Responsibilities:
//! - Numeric code generation
//! - OTP records in the scoped store (one live record per phone)
//! - Issue / verify / clear / cooldown queries with expiry and resend cooldown

pub mod code;
pub mod errors;
pub mod manager;
pub mod models;
pub mod types;

pub use code::{generate_code, DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH};
pub use errors::OtpError;
pub use manager::OtpManager;
pub use models::{OtpRecord, StoredRecord};
pub use types::{IssuedCode, OtpOptions};
