//! Persistence bridge - keeps a sanitized copy of the wizard fields per flow
//! so a reload can pre-fill the form.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::models::{ContactFields, JobFields};
use crate::common::FlowId;
use crate::kernel::{BaseScopedStore, StoreScope};

/// Only non-secret fields exist on this type; the typed-in code and the
/// credential have nowhere to go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardDraft {
    pub job: JobFields,
    pub contact: ContactFields,
}

impl WizardDraft {
    /// Load the draft for `flow_id`. An unreadable draft is dropped and
    /// reported as absent.
    pub async fn load(flow_id: FlowId, store: &dyn BaseScopedStore) -> Result<Option<Self>> {
        let key = flow_id.to_string();
        let Some(raw) = store.get(StoreScope::WizardDraft, &key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<WizardDraft>(&raw) {
            Ok(draft) => Ok(Some(draft)),
            Err(e) => {
                warn!(flow_id = %flow_id, error = %e, "Discarding unreadable wizard draft");
                store.delete(StoreScope::WizardDraft, &key).await?;
                Ok(None)
            }
        }
    }

    pub async fn save(&self, flow_id: FlowId, store: &dyn BaseScopedStore) -> Result<()> {
        let value = serde_json::to_string(self)?;
        store
            .set(StoreScope::WizardDraft, &flow_id.to_string(), value)
            .await?;
        debug!(flow_id = %flow_id, "Wizard draft saved");
        Ok(())
    }

    pub async fn clear(flow_id: FlowId, store: &dyn BaseScopedStore) -> Result<()> {
        store
            .delete(StoreScope::WizardDraft, &flow_id.to_string())
            .await
    }
}
