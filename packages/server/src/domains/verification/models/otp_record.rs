use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::hash_identifier;
use crate::kernel::{BaseScopedStore, StoreScope};

/// OtpRecord - the single live code for one phone identifier
///
/// Reissuing replaces the record entirely; there is never more than one
/// outstanding code per phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRecord {
    pub code: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_sent_at: DateTime<Utc>,
}

/// What the store holds for a phone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredRecord {
    Live(OtpRecord),
    Missing,
    /// Present but unparsable; behaves like `Missing` and is overwritten on reissue
    Corrupt,
}

impl StoredRecord {
    pub fn live(self) -> Option<OtpRecord> {
        match self {
            StoredRecord::Live(record) => Some(record),
            StoredRecord::Missing | StoredRecord::Corrupt => None,
        }
    }
}

impl OtpRecord {
    pub fn new(code: String, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            code,
            expires_at: issued_at + ttl,
            last_sent_at: issued_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// `max(0, cooldown - (now - last_sent_at))`
    pub fn cooldown_remaining(&self, now: DateTime<Utc>, cooldown: Duration) -> Duration {
        let remaining = cooldown - (now - self.last_sent_at);
        remaining.max(Duration::zero())
    }

    /// Exact comparison after trimming the submitted value
    pub fn matches(&self, submitted: &str) -> bool {
        submitted.trim() == self.code
    }

    // =========================================================================
    // Store access - ALL reads/writes of OTP records go through here
    // =========================================================================

    pub fn storage_key(phone_number: &str) -> String {
        hash_identifier(phone_number)
    }

    pub async fn find(phone_number: &str, store: &dyn BaseScopedStore) -> Result<StoredRecord> {
        let key = Self::storage_key(phone_number);
        let Some(raw) = store.get(StoreScope::Otp, &key).await? else {
            return Ok(StoredRecord::Missing);
        };

        match serde_json::from_str::<OtpRecord>(&raw) {
            Ok(record) => Ok(StoredRecord::Live(record)),
            Err(e) => {
                warn!(phone_key = %key, error = %e, "Unparsable OTP record in store");
                Ok(StoredRecord::Corrupt)
            }
        }
    }

    pub async fn save(&self, phone_number: &str, store: &dyn BaseScopedStore) -> Result<()> {
        let value = serde_json::to_string(self)?;
        store
            .set(StoreScope::Otp, &Self::storage_key(phone_number), value)
            .await
    }

    pub async fn delete(phone_number: &str, store: &dyn BaseScopedStore) -> Result<()> {
        store
            .delete(StoreScope::Otp, &Self::storage_key(phone_number))
            .await
    }
}
