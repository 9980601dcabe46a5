//! Wizard state machine
//!
//! Four ordered stages. Forward moves are guarded; backward moves to any
//! earlier stage are always allowed and keep entered values. The machine does
//! no IO: issuing and checking codes, persistence and submission are driven
//! by `WizardFlow`, which calls the transition methods here once their side
//! effects have succeeded.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::{Attachment, ContactFields, ContactFieldsPatch, JobFields, JobFieldsPatch};
use super::validation::{validate_contact, validate_credential, validate_job};
use super::{WizardDraft, WizardError};
use crate::kernel::NewAccount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    JobDetails,
    ContactInfo,
    OtpPending,
    CredentialSetup,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::JobDetails => "job_details",
            Stage::ContactInfo => "contact_info",
            Stage::OtpPending => "otp_pending",
            Stage::CredentialSetup => "credential_setup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current stage plus the input that only exists while in it.
///
/// The typed-in code and the credential live inside their variants: leaving
/// the stage drops them, and they never appear in a draft.
#[derive(Clone, PartialEq, Eq)]
enum Step {
    JobDetails,
    ContactInfo,
    OtpPending { otp_input: String },
    CredentialSetup { credential: String },
}

impl Step {
    fn stage(&self) -> Stage {
        match self {
            Step::JobDetails => Stage::JobDetails,
            Step::ContactInfo => Stage::ContactInfo,
            Step::OtpPending { .. } => Stage::OtpPending,
            Step::CredentialSetup { .. } => Stage::CredentialSetup,
        }
    }

    fn entering(stage: Stage) -> Self {
        match stage {
            Stage::JobDetails => Step::JobDetails,
            Stage::ContactInfo => Step::ContactInfo,
            Stage::OtpPending => Step::OtpPending {
                otp_input: String::new(),
            },
            Stage::CredentialSetup => Step::CredentialSetup {
                credential: String::new(),
            },
        }
    }
}

// Secrets stay out of debug output
impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stage())
    }
}

#[derive(Debug, Clone)]
pub struct WizardMachine {
    step: Step,
    job: JobFields,
    contact: ContactFields,
    /// Phone value a successful verification was granted for
    verified_phone: Option<String>,
}

impl Default for WizardMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardMachine {
    pub fn new() -> Self {
        Self {
            step: Step::JobDetails,
            job: JobFields::default(),
            contact: ContactFields::default(),
            verified_phone: None,
        }
    }

    /// Pre-fill fields from a draft. The stage always restarts at `JobDetails`.
    pub fn from_draft(draft: WizardDraft) -> Self {
        Self {
            job: draft.job,
            contact: draft.contact,
            ..Self::new()
        }
    }

    pub fn stage(&self) -> Stage {
        self.step.stage()
    }

    pub fn job(&self) -> &JobFields {
        &self.job
    }

    pub fn contact(&self) -> &ContactFields {
        &self.contact
    }

    /// Phone as used for OTP keys
    pub fn phone(&self) -> &str {
        self.contact.phone.trim()
    }

    /// True only while the held phone is the one that was verified
    pub fn is_verified(&self) -> bool {
        self.verified_phone.as_deref() == Some(self.phone())
    }

    /// Sanitized projection for the persistence bridge
    pub fn draft(&self) -> WizardDraft {
        WizardDraft {
            job: self.job.clone(),
            contact: self.contact.clone(),
        }
    }

    fn require(&self, expected: Stage) -> Result<(), WizardError> {
        let actual = self.stage();
        if actual != expected {
            return Err(WizardError::WrongStage { expected, actual });
        }
        Ok(())
    }

    // =========================================================================
    // Field edits
    // =========================================================================

    pub fn update_job(&mut self, patch: JobFieldsPatch) -> Result<(), WizardError> {
        self.require(Stage::JobDetails)?;
        self.job.apply(patch);
        Ok(())
    }

    pub fn attach(&mut self, attachment: Attachment) -> Result<(), WizardError> {
        self.require(Stage::JobDetails)?;
        self.job.attachments.push(attachment);
        Ok(())
    }

    /// Editing the phone number drops any earlier verification
    pub fn update_contact(&mut self, patch: ContactFieldsPatch) -> Result<(), WizardError> {
        self.require(Stage::ContactInfo)?;
        let previous_phone = self.phone().to_string();
        self.contact.apply(patch);
        if self.phone() != previous_phone {
            self.verified_phone = None;
        }
        Ok(())
    }

    pub fn set_otp_input(&mut self, code: impl Into<String>) -> Result<(), WizardError> {
        match &mut self.step {
            Step::OtpPending { otp_input } => {
                *otp_input = code.into();
                Ok(())
            }
            other => Err(WizardError::WrongStage {
                expected: Stage::OtpPending,
                actual: other.stage(),
            }),
        }
    }

    pub fn otp_input(&self) -> Option<&str> {
        match &self.step {
            Step::OtpPending { otp_input } => Some(otp_input),
            _ => None,
        }
    }

    pub fn set_credential(&mut self, value: impl Into<String>) -> Result<(), WizardError> {
        match &mut self.step {
            Step::CredentialSetup { credential } => {
                *credential = value.into();
                Ok(())
            }
            other => Err(WizardError::WrongStage {
                expected: Stage::CredentialSetup,
                actual: other.stage(),
            }),
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// JobDetails -> ContactInfo once the required job fields are filled
    pub fn complete_job_details(&mut self) -> Result<(), WizardError> {
        self.require(Stage::JobDetails)?;
        validate_job(&self.job)?;
        self.step = Step::ContactInfo;
        Ok(())
    }

    /// Guard for leaving ContactInfo; the caller issues a code next
    pub fn check_contact(&self) -> Result<(), WizardError> {
        self.require(Stage::ContactInfo)?;
        validate_contact(&self.contact)?;
        Ok(())
    }

    /// ContactInfo -> OtpPending after a code was issued
    pub fn code_issued(&mut self) -> Result<(), WizardError> {
        self.check_contact()?;
        self.step = Step::entering(Stage::OtpPending);
        Ok(())
    }

    /// ContactInfo -> CredentialSetup when this exact phone was verified before
    pub fn skip_verified_phone(&mut self) -> Result<(), WizardError> {
        self.check_contact()?;
        if !self.is_verified() {
            return Err(WizardError::NotVerified);
        }
        self.step = Step::entering(Stage::CredentialSetup);
        Ok(())
    }

    /// OtpPending -> CredentialSetup after the code was verified and consumed
    pub fn phone_verified(&mut self) -> Result<(), WizardError> {
        self.require(Stage::OtpPending)?;
        self.verified_phone = Some(self.phone().to_string());
        self.step = Step::entering(Stage::CredentialSetup);
        Ok(())
    }

    /// Guard for the final submission; builds the registration payload
    pub fn registration(&self) -> Result<NewAccount, WizardError> {
        let Step::CredentialSetup { credential } = &self.step else {
            return Err(WizardError::WrongStage {
                expected: Stage::CredentialSetup,
                actual: self.stage(),
            });
        };
        if !self.is_verified() {
            return Err(WizardError::NotVerified);
        }
        validate_credential(credential)?;

        Ok(NewAccount {
            name: self.contact.full_name.trim().to_string(),
            email: self.contact.email.trim().to_string(),
            phone: self.phone().to_string(),
            credential: credential.clone(),
        })
    }

    /// Move to `target` if it is the current or an earlier stage
    pub fn back_to(&mut self, target: Stage) -> Result<(), WizardError> {
        let current = self.stage();
        if target > current {
            return Err(WizardError::InvalidBackTarget {
                from: current,
                to: target,
            });
        }
        if target < current {
            self.step = Step::entering(target);
        }
        Ok(())
    }
}
