use std::sync::Arc;

use axum::{
    extract::{Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use job_scoring::{FileHandle, JobEditor};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::{editor_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenEditorPayload {
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoadJobPayload {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftPayload {
    pub title: Option<String>,
    pub description: Option<String>,
}

fn find_editor(state: &AppState, editor_id: &Uuid) -> Result<Arc<JobEditor>, ApiError> {
    state.editor(editor_id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Editor session not found" })),
        )
    })
}

/// POST /api/editors
pub async fn create_editor(
    Extension(state): Extension<AppState>,
    Json(payload): Json<OpenEditorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let (editor_id, editor) = state.open_editor();
    info!(%editor_id, job_id = ?payload.job_id, "editor opened");

    if let Some(job_id) = payload.job_id {
        if let Err(e) = editor.load(&job_id).await {
            state.close_editor(&editor_id);
            warn!(%editor_id, %job_id, "editor closed after failed load: {e}");
            return Err(editor_error(e));
        }
    }

    let body = Json(json!({
        "editorId": editor_id,
        "editor": editor.snapshot().await,
    }));
    Ok((StatusCode::CREATED, body))
}

/// GET /api/editors/{editorId}
pub async fn get_editor(
    Extension(state): Extension<AppState>,
    Path(editor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let editor = find_editor(&state, &editor_id)?;
    Ok(Json(editor.snapshot().await))
}

/// DELETE /api/editors/{editorId}
pub async fn close_editor(
    Extension(state): Extension<AppState>,
    Path(editor_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.close_editor(&editor_id) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Editor session not found" })),
        ));
    }
    info!(%editor_id, "editor closed");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn load_job(
    Extension(state): Extension<AppState>,
    Path(editor_id): Path<Uuid>,
    Json(payload): Json<LoadJobPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let editor = find_editor(&state, &editor_id)?;
    let snapshot = editor.load(&payload.job_id).await.map_err(editor_error)?;
    Ok(Json(snapshot))
}

pub async fn start_new(
    Extension(state): Extension<AppState>,
    Path(editor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let editor = find_editor(&state, &editor_id)?;
    let snapshot = editor.start_new().await.map_err(editor_error)?;
    Ok(Json(snapshot))
}

pub async fn enter_edit(
    Extension(state): Extension<AppState>,
    Path(editor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let editor = find_editor(&state, &editor_id)?;
    let snapshot = editor.enter_edit().await.map_err(editor_error)?;
    Ok(Json(snapshot))
}

pub async fn cancel_edit(
    Extension(state): Extension<AppState>,
    Path(editor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let editor = find_editor(&state, &editor_id)?;
    let snapshot = editor.cancel_edit().await.map_err(editor_error)?;
    Ok(Json(snapshot))
}

pub async fn update_draft(
    Extension(state): Extension<AppState>,
    Path(editor_id): Path<Uuid>,
    Json(payload): Json<DraftPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let editor = find_editor(&state, &editor_id)?;
    if let Some(title) = payload.title {
        editor.set_title(title).await.map_err(editor_error)?;
    }
    if let Some(description) = payload.description {
        editor.set_description(description).await.map_err(editor_error)?;
    }
    Ok(Json(editor.snapshot().await))
}

/// POST /api/editors/{editorId}/files (multipart, one part per file)
pub async fn attach_files(
    Extension(state): Extension<AppState>,
    Path(editor_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let editor = find_editor(&state, &editor_id)?;

    let mut handles = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": format!("Invalid upload: {e}") })),
        )
    })? {
        // Plain form fields carry no file.
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            warn!(%editor_id, file = %name, "upload read failed: {e}");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": format!("Could not read {name}: {e}") })),
            )
        })?;

        let mut handle = FileHandle::new(name, bytes.to_vec());
        if let Some(content_type) = content_type {
            handle = handle.with_content_type(content_type);
        }
        handles.push(handle);
    }

    let file_ids = editor.attach_files(handles).await.map_err(editor_error)?;
    let body = Json(json!({
        "fileIds": file_ids,
        "editor": editor.snapshot().await,
    }));
    Ok(body)
}

/// DELETE /api/editors/{editorId}/files/{fileId}
pub async fn remove_file(
    Extension(state): Extension<AppState>,
    Path((editor_id, file_id)): Path<(Uuid, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    let editor = find_editor(&state, &editor_id)?;
    let removed = editor.remove_file(file_id).await.map_err(editor_error)?;
    let body = Json(json!({
        "removed": removed,
        "editor": editor.snapshot().await,
    }));
    Ok(body)
}

/// POST /api/editors/{editorId}/save
pub async fn save_editor(
    Extension(state): Extension<AppState>,
    Path(editor_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let editor = find_editor(&state, &editor_id)?;
    let job = editor.save().await.map_err(editor_error)?;
    info!(%editor_id, job_id = %job.id, "job saved");

    let body = Json(json!({
        "message": "Job saved successfully",
        "jobId": job.id,
        "editor": editor.snapshot().await,
    }));
    Ok(body)
}
