//! HTTP client for the account registration backend.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{BaseAccountRegistry, NewAccount, RegistrationOutcome};

/// Wire shape of the backend response: `{success, id, role}` or
/// `{success: false, message}`.
#[derive(Debug, Deserialize)]
struct RegisterResponse {
    success: bool,
    #[serde(default, alias = "_id")]
    id: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<RegisterResponse> for RegistrationOutcome {
    fn from(response: RegisterResponse) -> Self {
        if response.success {
            RegistrationOutcome::Registered {
                id: response.id.unwrap_or_default(),
                role: response.role.unwrap_or_default(),
            }
        } else {
            RegistrationOutcome::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| "Registration failed".to_string()),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationClient {
    client: Client,
    base_url: String,
}

impl RegistrationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn register_url(&self) -> String {
        format!("{}/api/users/register", self.base_url)
    }
}

#[async_trait]
impl BaseAccountRegistry for RegistrationClient {
    async fn register_account(&self, account: &NewAccount) -> Result<RegistrationOutcome> {
        let url = self.register_url();
        debug!(url = %url, "Submitting account registration");

        let response = self
            .client
            .post(&url)
            .json(account)
            .send()
            .await
            .context("Request to registration backend failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read registration response")?;

        match serde_json::from_str::<RegisterResponse>(&body) {
            Ok(parsed) => Ok(parsed.into()),
            Err(e) if status.is_success() => {
                Err(e).context("Failed to parse registration response")
            }
            Err(_) => {
                warn!(status = %status, "Registration backend returned an error");
                anyhow::bail!("Registration backend returned {}", status)
            }
        }
    }
}
