use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{service_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

/// GET /api/jobs?skip=&limit=
pub async fn list_jobs(
    Extension(state): Extension<AppState>,
    Query(paging): Query<Paging>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .jobs
        .read_jobs(paging.skip, paging.limit)
        .await
        .map_err(service_error)?;
    Ok(Json(page))
}

/// DELETE /api/jobs/{jobId}
pub async fn delete_job(
    Extension(state): Extension<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.jobs.delete_job(&job_id).await.map_err(service_error)?;
    info!(%job_id, "job deleted");
    Ok(Json(message))
}

/// POST /api/jobs/{jobId}/analysis
pub async fn analyse_job(
    Extension(state): Extension<AppState>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state.jobs.read_job(&job_id).await.map_err(service_error)?;
    let description = job.description.clone().unwrap_or_default();
    let analysis = state
        .analyzer
        .analyse_job(&job.title, &description)
        .await
        .map_err(service_error)?;

    let body = Json(json!({
        "jobId": job.id,
        "title": job.title,
        "analysis": analysis,
    }));
    Ok(body)
}
