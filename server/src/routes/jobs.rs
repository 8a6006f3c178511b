use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::jobs_handlers::{analyse_job, delete_job, list_jobs};

pub fn job_routes() -> Router {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs/{jobId}", delete(delete_job))
        .route("/jobs/{jobId}/analysis", post(analyse_job))
}
