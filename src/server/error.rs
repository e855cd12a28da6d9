use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use thiserror::Error;

use crate::error::SurveyError;
use crate::github::UpstreamError;
use crate::model::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("{0}")]
    Validation(ValidationError),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Missing env var: {}", .0.join(", "))]
    Configuration(Vec<&'static str>),

    #[error("{0}")]
    Upstream(UpstreamError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SurveyError> for ApiError {
    fn from(err: SurveyError) -> Self {
        match err {
            SurveyError::Upstream(u) => ApiError::Upstream(u),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            log::debug!("Unreadable request body: {}", rejection.body_text());
            ApiError::InvalidJson
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Configuration(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(UpstreamError::Status { .. } | UpstreamError::UnexpectedBody(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Upstream(UpstreamError::Unreachable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable `ok:false` body shared by every error
    pub fn body(&self) -> serde_json::Value {
        let mut body = json!({
            "ok": false,
            "error": self.to_string(),
            "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        match self {
            ApiError::Validation(v) if !v.missing.is_empty() => {
                body["missing"] = json!(v.missing);
            }
            ApiError::Validation(v) => {
                body["invalid"] = json!(v.invalid);
            }
            ApiError::Configuration(_) | ApiError::Internal(_) => {
                body["stage"] = json!("server");
            }
            ApiError::Upstream(UpstreamError::Status { status, message }) => {
                body["stage"] = json!("github");
                body["githubStatus"] = json!(status);
                body["error"] = json!(message);
            }
            ApiError::Upstream(UpstreamError::UnexpectedBody(_)) => {
                body["stage"] = json!("github");
            }
            ApiError::Upstream(UpstreamError::Unreachable(_)) => {
                body["stage"] = json!("network");
            }
            ApiError::InvalidJson | ApiError::MethodNotAllowed | ApiError::PayloadTooLarge => {}
        }

        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::info!("Request rejected: {}", self);
        }

        (status, Json(self.body())).into_response()
    }
}
