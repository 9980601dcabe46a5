// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use super::{
    BaseAccountRegistry, BaseClock, BaseOtpTransport, MemoryScopedStore, NewAccount,
    RegistrationOutcome, ServerDeps,
};
use crate::domains::verification::OtpOptions;

// =============================================================================
// Mock Clock
// =============================================================================

/// Manually advanced clock for simulated time
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    /// Starts at 2025-01-01T12:00:00Z
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap())
    }

    fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseClock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// Mock OTP Transport
// =============================================================================

#[derive(Debug)]
struct SentCode {
    phone_number: String,
    code: String,
}

pub struct MockOtpTransport {
    sent: Arc<Mutex<Vec<SentCode>>>,
    fail: bool,
}

impl MockOtpTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// Every send returns an error
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// The most recent code sent to `phone_number`
    pub fn last_code_for(&self, phone_number: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.phone_number == phone_number)
            .map(|s| s.code.clone())
    }
}

impl Default for MockOtpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseOtpTransport for MockOtpTransport {
    async fn send(&self, phone_number: &str, code: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("Mock transport failure");
        }
        self.sent.lock().unwrap().push(SentCode {
            phone_number: phone_number.to_string(),
            code: code.to_string(),
        });
        Ok(())
    }
}

// =============================================================================
// Mock Account Registry
// =============================================================================

pub struct MockAccountRegistry {
    responses: Arc<Mutex<Vec<Result<RegistrationOutcome, String>>>>,
    calls: Arc<Mutex<Vec<NewAccount>>>,
}

impl MockAccountRegistry {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a rejection with the given backend message
    pub fn with_rejection(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Ok(RegistrationOutcome::Rejected {
                message: message.into(),
            }));
        self
    }

    /// Queue a transport failure
    pub fn with_transport_error(self, message: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(Err(message.into()));
        self
    }

    /// Accounts submitted so far
    pub fn calls(&self) -> Vec<NewAccount> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockAccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAccountRegistry for MockAccountRegistry {
    async fn register_account(&self, account: &NewAccount) -> Result<RegistrationOutcome> {
        self.calls.lock().unwrap().push(account.clone());

        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            responses.remove(0).map_err(anyhow::Error::msg)
        } else {
            // Default: registration succeeds
            Ok(RegistrationOutcome::Registered {
                id: format!("user-{}", self.calls.lock().unwrap().len()),
                role: "customer".to_string(),
            })
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub store: Arc<MemoryScopedStore>,
    pub clock: Arc<MockClock>,
    pub transport: Arc<MockOtpTransport>,
    pub registry: Arc<MockAccountRegistry>,
    pub otp_options: OtpOptions,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryScopedStore::new()),
            clock: Arc::new(MockClock::new()),
            transport: Arc::new(MockOtpTransport::new()),
            registry: Arc::new(MockAccountRegistry::new()),
            otp_options: OtpOptions::default(),
        }
    }

    /// Set a mock OTP transport
    pub fn mock_transport(mut self, transport: MockOtpTransport) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Set a mock account registry
    pub fn mock_registry(mut self, registry: MockAccountRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn otp_options(mut self, options: OtpOptions) -> Self {
        self.otp_options = options;
        self
    }

    /// Convert into ServerDeps; the mocks stay reachable through `self`
    pub fn server_deps(&self) -> Arc<ServerDeps> {
        Arc::new(ServerDeps::new(
            self.store.clone(),
            self.clock.clone(),
            self.transport.clone(),
            self.registry.clone(),
            self.otp_options,
        ))
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
