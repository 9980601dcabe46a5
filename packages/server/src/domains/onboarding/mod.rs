//! Onboarding domain - the "contact an expert" registration wizard
//!
//! Stages: JobDetails -> ContactInfo -> OtpPending -> CredentialSetup -> submitted.
//! Phone verification gates the last stage; drafts survive reloads.

pub mod draft;
pub mod errors;
pub mod flow;
pub mod machine;
pub mod models;
pub mod submission;
pub mod validation;

pub use draft::WizardDraft;
pub use errors::WizardError;
pub use flow::{AdvanceOutcome, Completion, FlowSnapshot, WizardFlow};
pub use machine::{Stage, WizardMachine};
pub use models::*;
pub use submission::{RedirectTarget, RegisteredAccount};
pub use validation::{Field, ValidationError};
