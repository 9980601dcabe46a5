// Expert Signup - API Core
//
// Backend for the "contact an expert" registration wizard: a four-stage form
// gated by phone verification (one-time passcodes), with drafts that survive
// reloads and a hand-off to the account registration backend.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
