//! Hand-off to the account registration backend

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use super::models::JobFields;
use super::WizardError;
use crate::kernel::{BaseAccountRegistry, NewAccount, RegistrationOutcome};

/// Where the client lands after signing up: the listing page pre-filtered by
/// the requested service and city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectTarget {
    pub service: String,
    pub city: String,
}

impl RedirectTarget {
    pub fn from_job(job: &JobFields) -> Self {
        Self {
            service: job.service.trim().to_string(),
            city: job.city.trim().to_string(),
        }
    }

    /// `/?job=<service>&city=<city>`, URL-encoded
    pub fn to_url(&self) -> String {
        format!(
            "/?job={}&city={}",
            urlencoding::encode(&self.service),
            urlencoding::encode(&self.city)
        )
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredAccount {
    pub id: String,
    pub role: String,
}

/// Submit the account. Backend refusals and transport failures both come back
/// as `RegistrationFailed` carrying the message to show the user.
pub async fn register_account(
    account: &NewAccount,
    registry: &dyn BaseAccountRegistry,
) -> Result<RegisteredAccount, WizardError> {
    match registry.register_account(account).await {
        Ok(RegistrationOutcome::Registered { id, role }) => {
            info!(account_id = %id, role = %role, "Account registered");
            Ok(RegisteredAccount { id, role })
        }
        Ok(RegistrationOutcome::Rejected { message }) => {
            info!(message = %message, "Registration rejected by backend");
            Err(WizardError::RegistrationFailed(message))
        }
        Err(e) => {
            warn!(error = %e, "Registration request failed");
            Err(WizardError::RegistrationFailed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockAccountRegistry;

    fn account() -> NewAccount {
        NewAccount {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "+15550001111".into(),
            credential: "secret1".into(),
        }
    }

    #[test]
    fn redirect_encodes_service_and_city() {
        let target = RedirectTarget {
            service: "Heat pumps & AC".into(),
            city: "New York".into(),
        };
        assert_eq!(target.to_url(), "/?job=Heat%20pumps%20%26%20AC&city=New%20York");
    }

    #[test]
    fn redirect_trims_job_fields() {
        let job = JobFields {
            service: " Plumbing ".into(),
            city: "Oslo ".into(),
            ..Default::default()
        };
        assert_eq!(RedirectTarget::from_job(&job).to_string(), "/?job=Plumbing&city=Oslo");
    }

    #[tokio::test]
    async fn rejection_message_is_passed_through() {
        let registry = MockAccountRegistry::new().with_rejection("Email already registered");
        let err = register_account(&account(), &registry).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
        assert_eq!(err.kind(), "registration_failed");
    }

    #[tokio::test]
    async fn success_returns_id_and_role() {
        let registry = MockAccountRegistry::new();
        let registered = register_account(&account(), &registry).await.unwrap();
        assert_eq!(registered.role, "customer");
        assert_eq!(registry.calls(), vec![account()]);
    }
}
