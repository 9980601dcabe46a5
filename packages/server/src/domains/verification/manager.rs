//! OTP lifecycle manager
//!
//! Issue, verify, clear and cooldown queries on top of the scoped store. Expiry
//! is enforced when a code is checked, so abandoned records need no reaping.
//!
//! Every operation on a phone runs under that phone's async lock. Several
//! server instances sharing one Postgres store would still need row locking;
//! a single process is covered here.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::{generate_code, IssuedCode, OtpError, OtpOptions, OtpRecord, StoredRecord};
use crate::kernel::{BaseClock, BaseOtpTransport, BaseScopedStore};

/// Held for the duration of one operation on a phone. On drop the map entry
/// is removed unless another caller holds or waits on the same lock.
struct PhoneLock<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for PhoneLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

pub struct OtpManager {
    store: Arc<dyn BaseScopedStore>,
    clock: Arc<dyn BaseClock>,
    transport: Arc<dyn BaseOtpTransport>,
    options: OtpOptions,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OtpManager {
    pub fn new(
        store: Arc<dyn BaseScopedStore>,
        clock: Arc<dyn BaseClock>,
        transport: Arc<dyn BaseOtpTransport>,
        options: OtpOptions,
    ) -> Self {
        Self {
            store,
            clock,
            transport,
            options,
            locks: DashMap::new(),
        }
    }

    pub fn options(&self) -> OtpOptions {
        self.options
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn lock(&self, phone_number: &str) -> PhoneLock<'_> {
        let key = OtpRecord::storage_key(phone_number);
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        PhoneLock {
            locks: &self.locks,
            key,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Issue a code with the manager's default options
    pub async fn issue(&self, phone_number: &str) -> Result<IssuedCode, OtpError> {
        self.issue_with(phone_number, self.options).await
    }

    /// Issue a code, replacing any previous record once the cooldown has elapsed.
    ///
    /// Fails with `CooldownActive` without touching the store while the last
    /// issuance is younger than `options.cooldown`.
    pub async fn issue_with(
        &self,
        phone_number: &str,
        options: OtpOptions,
    ) -> Result<IssuedCode, OtpError> {
        options.validate()?;
        let _guard = self.lock(phone_number).await;
        let now = self.clock.now();

        if let StoredRecord::Live(existing) =
            OtpRecord::find(phone_number, self.store.as_ref()).await?
        {
            let remaining = existing.cooldown_remaining(now, options.cooldown);
            if remaining > Duration::zero() {
                debug!(
                    phone_key = %OtpRecord::storage_key(phone_number),
                    remaining_ms = remaining.num_milliseconds(),
                    "OTP resend refused during cooldown"
                );
                return Err(OtpError::CooldownActive { remaining });
            }
        }

        let code = generate_code(options.length)?;
        let record = OtpRecord::new(code.clone(), now, options.ttl);
        record.save(phone_number, self.store.as_ref()).await?;

        if let Err(e) = self.transport.send(phone_number, &code).await {
            warn!(
                phone_key = %OtpRecord::storage_key(phone_number),
                error = %e,
                "OTP delivery failed, discarding record"
            );
            OtpRecord::delete(phone_number, self.store.as_ref()).await?;
            return Err(OtpError::Delivery(e));
        }

        info!(
            phone_key = %OtpRecord::storage_key(phone_number),
            expires_at = %record.expires_at,
            "OTP issued"
        );
        Ok(IssuedCode {
            code,
            expires_at: record.expires_at,
        })
    }

    /// Check `submitted` against the live record. Does not consume it.
    pub async fn verify(&self, phone_number: &str, submitted: &str) -> Result<(), OtpError> {
        let _guard = self.lock(phone_number).await;
        self.check(phone_number, submitted).await
    }

    /// Verify and, on success, delete the record under the same lock so the
    /// code cannot be replayed.
    pub async fn verify_and_consume(
        &self,
        phone_number: &str,
        submitted: &str,
    ) -> Result<(), OtpError> {
        let _guard = self.lock(phone_number).await;
        self.check(phone_number, submitted).await?;
        OtpRecord::delete(phone_number, self.store.as_ref()).await?;
        info!(
            phone_key = %OtpRecord::storage_key(phone_number),
            "OTP verified and consumed"
        );
        Ok(())
    }

    async fn check(&self, phone_number: &str, submitted: &str) -> Result<(), OtpError> {
        let record = match OtpRecord::find(phone_number, self.store.as_ref()).await? {
            StoredRecord::Live(record) => record,
            StoredRecord::Missing => return Err(OtpError::NoCodeIssued),
            StoredRecord::Corrupt => return Err(OtpError::InvalidStore),
        };

        if record.is_expired_at(self.clock.now()) {
            return Err(OtpError::Expired);
        }
        if !record.matches(submitted) {
            return Err(OtpError::Mismatch);
        }
        Ok(())
    }

    /// Delete the record for `phone_number`. Idempotent.
    pub async fn clear(&self, phone_number: &str) -> Result<(), OtpError> {
        let _guard = self.lock(phone_number).await;
        OtpRecord::delete(phone_number, self.store.as_ref()).await?;
        Ok(())
    }

    /// Time left before a resend is allowed, using the manager's cooldown
    pub async fn remaining_cooldown(&self, phone_number: &str) -> Result<Duration, OtpError> {
        self.remaining_cooldown_with(phone_number, self.options.cooldown)
            .await
    }

    /// `max(0, cooldown - (now - last_sent_at))`, or zero with no readable record
    pub async fn remaining_cooldown_with(
        &self,
        phone_number: &str,
        cooldown: Duration,
    ) -> Result<Duration, OtpError> {
        let remaining = OtpRecord::find(phone_number, self.store.as_ref())
            .await?
            .live()
            .map(|record| record.cooldown_remaining(self.clock.now(), cooldown))
            .unwrap_or_else(Duration::zero);
        Ok(remaining)
    }

    /// Expiry of the live code, if one is stored
    pub async fn expires_at(&self, phone_number: &str) -> Result<Option<DateTime<Utc>>, OtpError> {
        Ok(OtpRecord::find(phone_number, self.store.as_ref())
            .await?
            .live()
            .map(|record| record.expires_at))
    }
}
