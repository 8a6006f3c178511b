use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::editor_handlers::{
    attach_files, cancel_edit, close_editor, create_editor, enter_edit, get_editor, load_job,
    remove_file, save_editor, start_new, update_draft,
};

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn editor_routes() -> Router {
    Router::new()
        .route("/editors", post(create_editor))
        .route("/editors/{editorId}", get(get_editor).delete(close_editor))
        .route("/editors/{editorId}/load", post(load_job))
        .route("/editors/{editorId}/new", post(start_new))
        .route("/editors/{editorId}/edit", post(enter_edit))
        .route("/editors/{editorId}/cancel", post(cancel_edit))
        .route("/editors/{editorId}/draft", patch(update_draft))
        .route(
            "/editors/{editorId}/files",
            post(attach_files).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/editors/{editorId}/files/{fileId}", delete(remove_file))
        .route("/editors/{editorId}/save", post(save_editor))
}
