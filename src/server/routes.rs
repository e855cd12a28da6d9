use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use super::cors;
use super::error::ApiError;
use super::state::AppState;
use super::upsert::upsert_submission;
use crate::model::SubmissionPayload;

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub async fn health_handler(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "ok": true,
        "message": "Survey API is alive",
        "method": method.as_str(),
        "path": uri.path(),
        "hasToken": config.token().is_some(),
        "hasOwner": config.owner().is_some(),
        "hasRepo": config.repo().is_some(),
        "time": now_iso(),
    }))
}

/// Oversized or unreadable bodies still get a JSON error with CORS headers
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match body {
        Ok(body) => submit(&state, &body).await,
        Err(rejection) => Err(ApiError::from(rejection)),
    };
    let mut response = match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => e.into_response(),
    };
    with_cors(&state, &headers, &mut response);
    response
}

pub async fn preflight_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    with_cors(&state, &headers, &mut response);
    response
}

pub async fn method_not_allowed_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let mut response = ApiError::MethodNotAllowed.into_response();
    with_cors(&state, &headers, &mut response);
    response
}

fn with_cors(state: &AppState, headers: &HeaderMap, response: &mut Response) {
    let origin = cors::pick_origin(cors::request_origin(headers), &state.origins);
    cors::apply_headers(response.headers_mut(), &origin);
}

async fn submit(state: &AppState, body: &[u8]) -> Result<Value, ApiError> {
    // configuration first: a misconfigured server rejects everything the same way
    let tracker = state
        .tracker
        .as_deref()
        .ok_or_else(|| ApiError::Configuration(state.config.missing_settings()))?;

    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
    if !value.is_object() {
        return Err(ApiError::InvalidJson);
    }
    let payload: SubmissionPayload = serde_json::from_value(value).map_err(|_| ApiError::InvalidJson)?;

    let record = payload.validate(Utc::now()).map_err(ApiError::Validation)?;
    let outcome = upsert_submission(tracker, &record, &state.labels).await?;

    let issue = outcome.issue();
    Ok(json!({
        "ok": true,
        "message": "Submitted.",
        "issue": {
            "number": issue.number,
            "url": issue.html_url,
        },
        "closed": outcome.closed(),
        "closeFailures": outcome.failed(),
        "time": now_iso(),
    }))
}
