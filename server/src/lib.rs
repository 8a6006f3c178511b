pub mod config;
pub mod handlers;
pub mod routes;
pub mod state;

use axum::{Extension, Router};

use routes::{editor::editor_routes, jobs::job_routes};
use state::AppState;

/// Every route under `/api`, with the shared state attached.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", editor_routes().merge(job_routes()))
        .layer(Extension(state))
}
