use super::machine::Stage;
use super::validation::ValidationError;
use crate::domains::verification::OtpError;

/// Everything that can keep a wizard flow on its current stage
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    /// Message from the registration backend, passed through verbatim
    #[error("{0}")]
    RegistrationFailed(String),

    #[error("Phone number has not been verified")]
    NotVerified,

    #[error("This step is only available at stage {expected} (current stage: {actual})")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("Cannot go back from {from} to {to}")]
    InvalidBackTarget { from: Stage, to: Stage },

    #[error("This registration has already been submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for WizardError {
    fn from(e: anyhow::Error) -> Self {
        WizardError::Storage(e)
    }
}

impl WizardError {
    pub fn kind(&self) -> &'static str {
        match self {
            WizardError::Validation(e) => e.kind(),
            WizardError::Otp(e) => e.kind(),
            WizardError::RegistrationFailed(_) => "registration_failed",
            WizardError::NotVerified => "not_verified",
            WizardError::WrongStage { .. } => "wrong_stage",
            WizardError::InvalidBackTarget { .. } => "invalid_back_target",
            WizardError::AlreadySubmitted => "already_submitted",
            WizardError::Storage(_) => "storage",
        }
    }
}
