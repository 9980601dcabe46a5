//! WizardFlow - drives one registration wizard against the server deps.
//!
//! The machine decides whether a move is legal; the flow performs the side
//! effects that gate it (issuing and consuming codes, saving drafts, calling
//! the registration backend) and only then commits the transition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::machine::{Stage, WizardMachine};
use super::models::{
    Attachment, AttachmentSummary, ContactFields, ContactFieldsPatch, JobFields, JobFieldsPatch,
};
use super::submission::{register_account, RedirectTarget, RegisteredAccount};
use super::{WizardDraft, WizardError};
use crate::common::FlowId;
use crate::domains::verification::errors::seconds_ceil;
use crate::kernel::ServerDeps;

/// Final result of a submitted flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub account: RegisteredAccount,
    pub redirect: RedirectTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved forward to this stage
    Advanced(Stage),
    /// Registration succeeded; storage for this flow has been purged
    Completed(Completion),
}

/// Read-only view for rendering, without secrets
#[derive(Debug, Clone, Serialize)]
pub struct FlowSnapshot {
    pub flow_id: FlowId,
    pub stage: Stage,
    pub job: JobFields,
    /// Held in memory with the flow, never written to the draft
    pub attachments: Vec<AttachmentSummary>,
    pub contact: ContactFields,
    pub verified: bool,
    /// Drives the resend countdown; correctness is enforced on issue
    pub resend_available_in_seconds: i64,
    pub code_expires_at: Option<DateTime<Utc>>,
    pub submitted: bool,
}

pub struct WizardFlow {
    id: FlowId,
    machine: WizardMachine,
    deps: Arc<ServerDeps>,
    completion: Option<Completion>,
}

impl WizardFlow {
    /// Start a flow at `JobDetails`, pre-filled from a saved draft if one exists
    pub async fn mount(id: FlowId, deps: Arc<ServerDeps>) -> Result<Self, WizardError> {
        let machine = match WizardDraft::load(id, deps.store.as_ref()).await? {
            Some(draft) => {
                debug!(flow_id = %id, "Resuming wizard from draft");
                WizardMachine::from_draft(draft)
            }
            None => WizardMachine::new(),
        };

        Ok(Self {
            id,
            machine,
            deps,
            completion: None,
        })
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.machine.stage()
    }

    pub fn machine(&self) -> &WizardMachine {
        &self.machine
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.completion.is_some() {
            return Err(WizardError::AlreadySubmitted);
        }
        Ok(())
    }

    async fn persist(&self) -> Result<(), WizardError> {
        self.machine
            .draft()
            .save(self.id, self.deps.store.as_ref())
            .await?;
        Ok(())
    }

    // =========================================================================
    // Field edits (persisted on every change)
    // =========================================================================

    pub async fn update_job(&mut self, patch: JobFieldsPatch) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.machine.update_job(patch)?;
        self.persist().await
    }

    pub fn attach(&mut self, attachment: Attachment) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.machine.attach(attachment)
    }

    pub async fn update_contact(&mut self, patch: ContactFieldsPatch) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.machine.update_contact(patch)?;
        self.persist().await
    }

    pub fn enter_code(&mut self, code: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.machine.set_otp_input(code)
    }

    pub fn enter_credential(&mut self, credential: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.machine.set_credential(credential)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Attempt the guarded forward transition out of the current stage
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, WizardError> {
        self.ensure_open()?;

        match self.machine.stage() {
            Stage::JobDetails => self.machine.complete_job_details()?,
            Stage::ContactInfo => self.leave_contact_info().await?,
            Stage::OtpPending => self.verify_code().await?,
            Stage::CredentialSetup => {
                let completion = self.submit().await?;
                return Ok(AdvanceOutcome::Completed(completion));
            }
        }

        let stage = self.machine.stage();
        debug!(flow_id = %self.id, stage = %stage, "Wizard advanced");
        Ok(AdvanceOutcome::Advanced(stage))
    }

    async fn leave_contact_info(&mut self) -> Result<(), WizardError> {
        self.machine.check_contact()?;

        if self.machine.is_verified() {
            return self.machine.skip_verified_phone();
        }

        let issued = self.deps.otp.issue(self.machine.phone()).await?;
        debug!(flow_id = %self.id, expires_at = %issued.expires_at, "Code issued for flow");
        self.machine.code_issued()
    }

    async fn verify_code(&mut self) -> Result<(), WizardError> {
        let submitted = self.machine.otp_input().unwrap_or_default().to_string();
        self.deps
            .otp
            .verify_and_consume(self.machine.phone(), &submitted)
            .await?;
        info!(flow_id = %self.id, "Phone verified");
        self.machine.phone_verified()
    }

    async fn submit(&mut self) -> Result<Completion, WizardError> {
        let account = self.machine.registration()?;
        let registered =
            register_account(&account, self.deps.account_registry.as_ref()).await?;

        // The account exists from here on; nothing below may lead to a resubmit
        let completion = Completion {
            account: registered,
            redirect: RedirectTarget::from_job(self.machine.job()),
        };
        self.completion = Some(completion.clone());
        info!(
            flow_id = %self.id,
            redirect = %completion.redirect,
            "Wizard submitted"
        );

        if let Err(e) = self.deps.otp.clear(&account.phone).await {
            warn!(flow_id = %self.id, error = %e, "Failed to clear OTP record after submit");
        }
        if let Err(e) = WizardDraft::clear(self.id, self.deps.store.as_ref()).await {
            warn!(flow_id = %self.id, error = %e, "Failed to clear wizard draft after submit");
        }

        Ok(completion)
    }

    /// Return to `stage` (current or earlier). Entered values are kept.
    pub fn back(&mut self, stage: Stage) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.machine.back_to(stage)
    }

    /// Issue a fresh code while waiting for one; the cooldown applies
    pub async fn resend(&mut self) -> Result<DateTime<Utc>, WizardError> {
        self.ensure_open()?;
        if self.machine.stage() != Stage::OtpPending {
            return Err(WizardError::WrongStage {
                expected: Stage::OtpPending,
                actual: self.machine.stage(),
            });
        }

        let issued = self.deps.otp.issue(self.machine.phone()).await?;
        info!(flow_id = %self.id, "Code resent");
        Ok(issued.expires_at)
    }

    pub async fn snapshot(&self) -> Result<FlowSnapshot, WizardError> {
        let phone = self.machine.phone();
        let (cooldown, expires_at) = if phone.is_empty() || self.completion.is_some() {
            (0, None)
        } else {
            let remaining = self.deps.otp.remaining_cooldown(phone).await?;
            (seconds_ceil(&remaining), self.deps.otp.expires_at(phone).await?)
        };

        Ok(FlowSnapshot {
            flow_id: self.id,
            stage: self.machine.stage(),
            job: self.machine.job().clone(),
            attachments: self
                .machine
                .job()
                .attachments
                .iter()
                .map(AttachmentSummary::from)
                .collect(),
            contact: self.machine.contact().clone(),
            verified: self.machine.is_verified(),
            resend_available_in_seconds: cooldown,
            code_expires_at: expires_at,
            submitted: self.completion.is_some(),
        })
    }
}
