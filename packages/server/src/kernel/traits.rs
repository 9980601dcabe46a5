// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// OTP lifecycle and wizard rules live in domains/ and use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseScopedStore, BaseClock)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Scoped Store Trait (Infrastructure - key/value persistence)
// =============================================================================

/// Named partitions of the scoped store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreScope {
    /// OTP records keyed by hashed phone identifier
    Otp,
    /// Wizard drafts keyed by flow id
    WizardDraft,
}

impl StoreScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreScope::Otp => "otp",
            StoreScope::WizardDraft => "wizard_draft",
        }
    }
}

#[async_trait]
pub trait BaseScopedStore: Send + Sync {
    /// Read the raw value stored under `key`, if any
    async fn get(&self, scope: StoreScope, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, scope: StoreScope, key: &str, value: String) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn delete(&self, scope: StoreScope, key: &str) -> Result<()>;

    /// Backend name reported by the health endpoint
    fn backend(&self) -> &'static str;

    /// Check the backend is reachable
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Clock Trait (Infrastructure - wall time, replaceable in tests)
// =============================================================================

pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// OTP Transport Trait (Infrastructure - SMS delivery)
// =============================================================================

#[async_trait]
pub trait BaseOtpTransport: Send + Sync {
    /// Deliver `code` to `phone_number`. Fire-and-forget from the caller's view.
    async fn send(&self, phone_number: &str, code: &str) -> Result<()>;
}

// =============================================================================
// Account Registry Trait (Infrastructure - external registration backend)
// =============================================================================

/// Data handed to the registration backend once the phone is verified
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "password")]
    pub credential: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Outcome reported by the registration backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationOutcome {
    Registered { id: String, role: String },
    Rejected { message: String },
}

#[async_trait]
pub trait BaseAccountRegistry: Send + Sync {
    /// Register the account. `Err` is reserved for transport failures;
    /// a backend refusal is `Ok(RegistrationOutcome::Rejected)`.
    async fn register_account(&self, account: &NewAccount) -> Result<RegistrationOutcome>;
}
