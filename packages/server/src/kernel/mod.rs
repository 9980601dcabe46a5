//! Kernel module - server infrastructure and dependencies.

pub mod clock;
pub mod deps;
pub mod otp_transport;
pub mod registration_client;
pub mod scoped_store;
pub mod test_dependencies;
pub mod traits;

pub use clock::SystemClock;
pub use deps::ServerDeps;
pub use otp_transport::LoggingOtpTransport;
pub use registration_client::RegistrationClient;
pub use scoped_store::{MemoryScopedStore, PostgresScopedStore};
pub use test_dependencies::TestDependencies;
pub use traits::*;
