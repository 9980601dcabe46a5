//! HTTP error mapping for wizard failures

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::common::FlowId;
use crate::domains::onboarding::{Field, WizardError};
use crate::domains::verification::OtpError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("Flow {0} is not mounted")]
    FlowNotFound(FlowId),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<i64>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::FlowNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Wizard(e) => match e {
                WizardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                WizardError::RegistrationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
                WizardError::Otp(OtpError::CooldownActive { .. }) => StatusCode::TOO_MANY_REQUESTS,
                WizardError::Otp(OtpError::Storage(_) | OtpError::Delivery(_)) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                WizardError::Otp(_) => StatusCode::BAD_REQUEST,
                WizardError::NotVerified => StatusCode::FORBIDDEN,
                WizardError::WrongStage { .. }
                | WizardError::InvalidBackTarget { .. }
                | WizardError::AlreadySubmitted => StatusCode::CONFLICT,
                WizardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::FlowNotFound(_) => ErrorBody {
                error: "flow_not_found",
                message: self.to_string(),
                field: None,
                retry_after_seconds: None,
            },
            ApiError::Wizard(e) => {
                let internal = self.status() == StatusCode::INTERNAL_SERVER_ERROR;
                ErrorBody {
                    error: e.kind(),
                    message: if internal {
                        "Something went wrong. Please try again".to_string()
                    } else {
                        e.to_string()
                    },
                    field: match e {
                        WizardError::Validation(v) => v.field(),
                        _ => None,
                    },
                    retry_after_seconds: match e {
                        WizardError::Otp(otp) => otp.retry_after_seconds(),
                        _ => None,
                    },
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = ?self, "Request failed");
        }

        let body = self.body();
        let retry_after = body.retry_after_seconds;
        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
