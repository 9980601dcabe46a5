//! Wizard flow endpoints
//!
//! A flow is addressed by a client-generated UUID that lives as long as the
//! browser tab. Mounting (PUT) always restarts at the first stage, pre-filled
//! from the saved draft.

use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::{header, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::FlowId;
use crate::domains::onboarding::{
    AdvanceOutcome, Attachment, ContactFieldsPatch, FlowSnapshot, JobFieldsPatch, RegisteredAccount, Stage,
    WizardFlow,
};
use crate::server::app::AppState;
use crate::server::error::ApiError;

const FILE_NAME_HEADER: &str = "x-file-name";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdvanceRequest {
    /// Code typed in at `otp_pending`
    pub otp_code: Option<String>,
    /// Password chosen at `credential_setup`
    pub credential: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BackRequest {
    pub stage: Stage,
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    #[serde(flatten)]
    pub flow: FlowSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<RegisteredAccount>,
    /// Set once registration succeeded, e.g. `/?job=Plumbing&city=Oslo`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

pub async fn mount_flow(
    Extension(state): Extension<AppState>,
    Path(flow_id): Path<FlowId>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    let flow = WizardFlow::mount(flow_id, state.deps.clone()).await?;
    let flow = state.flows.insert(flow);
    let flow = flow.lock().await;
    info!(flow_id = %flow_id, "Flow mounted");
    Ok(Json(flow.snapshot().await?))
}

pub async fn get_flow(
    Extension(state): Extension<AppState>,
    Path(flow_id): Path<FlowId>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    let flow = state.flow(flow_id)?;
    let flow = flow.lock().await;
    Ok(Json(flow.snapshot().await?))
}

pub async fn update_job_fields(
    Extension(state): Extension<AppState>,
    Path(flow_id): Path<FlowId>,
    Json(patch): Json<JobFieldsPatch>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    let flow = state.flow(flow_id)?;
    let mut flow = flow.lock().await;
    flow.update_job(patch).await?;
    Ok(Json(flow.snapshot().await?))
}

pub async fn update_contact_fields(
    Extension(state): Extension<AppState>,
    Path(flow_id): Path<FlowId>,
    Json(patch): Json<ContactFieldsPatch>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    let flow = state.flow(flow_id)?;
    let mut flow = flow.lock().await;
    flow.update_contact(patch).await?;
    Ok(Json(flow.snapshot().await?))
}

/// Raw file upload at `job_details`. The name comes from `X-File-Name`.
/// Files live with the mounted flow only and are gone after a remount.
pub async fn attach_file(
    Extension(state): Extension<AppState>,
    Path(flow_id): Path<FlowId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<FlowSnapshot>, ApiError> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };
    let attachment = Attachment {
        file_name: header_value(FILE_NAME_HEADER).unwrap_or_else(|| "attachment".to_string()),
        content_type: header_value(header::CONTENT_TYPE.as_str())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        bytes: body.to_vec(),
    };

    let flow = state.flow(flow_id)?;
    let mut flow = flow.lock().await;
    flow.attach(attachment)?;
    Ok(Json(flow.snapshot().await?))
}

pub async fn advance_flow(
    Extension(state): Extension<AppState>,
    Path(flow_id): Path<FlowId>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<AdvanceResponse>, ApiError> {
    let flow = state.flow(flow_id)?;
    let mut flow = flow.lock().await;

    if let Some(code) = request.otp_code {
        flow.enter_code(code)?;
    }
    if let Some(credential) = request.credential {
        flow.enter_credential(credential)?;
    }

    let outcome = flow.advance().await?;
    let snapshot = flow.snapshot().await?;

    let response = match outcome {
        AdvanceOutcome::Advanced(_) => AdvanceResponse {
            flow: snapshot,
            account: None,
            redirect: None,
        },
        AdvanceOutcome::Completed(completion) => {
            state.flows.remove(flow_id);
            AdvanceResponse {
                flow: snapshot,
                account: Some(completion.account),
                redirect: Some(completion.redirect.to_url()),
            }
        }
    };
    Ok(Json(response))
}

pub async fn back_flow(
    Extension(state): Extension<AppState>,
    Path(flow_id): Path<FlowId>,
    Json(request): Json<BackRequest>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    let flow = state.flow(flow_id)?;
    let mut flow = flow.lock().await;
    flow.back(request.stage)?;
    Ok(Json(flow.snapshot().await?))
}

pub async fn resend_code(
    Extension(state): Extension<AppState>,
    Path(flow_id): Path<FlowId>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    let flow = state.flow(flow_id)?;
    let mut flow = flow.lock().await;
    flow.resend().await?;
    Ok(Json(flow.snapshot().await?))
}
