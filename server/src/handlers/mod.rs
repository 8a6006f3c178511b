pub mod editor_handlers;
pub mod jobs_handlers;

use axum::{http::StatusCode, Json};
use job_scoring::{EditorError, ServiceError};
use serde_json::{json, Value};

pub type ApiError = (StatusCode, Json<Value>);

pub fn editor_error(err: EditorError) -> ApiError {
    let status = match &err {
        EditorError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EditorError::NotFound(_) => StatusCode::NOT_FOUND,
        EditorError::NotEditing | EditorError::Busy | EditorError::Stale => StatusCode::CONFLICT,
        EditorError::Disposed => StatusCode::GONE,
        EditorError::Load(_) | EditorError::Upload { .. } | EditorError::Persist(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(json!({ "message": err.to_string() })))
}

pub fn service_error(err: ServiceError) -> ApiError {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "message": err.to_string() })))
}
