use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::ws::AppState;

/// Serve the client page for any plain GET. Read failures become a bare 404.
pub async fn index_handler(State(app_state): State<AppState>) -> Response {
    match tokio::fs::read(app_state.index_path.as_path()).await {
        Ok(body) => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body).into_response(),
        Err(e) => {
            tracing::warn!(
                "Cannot read index page {}: {}",
                app_state.index_path.display(),
                e
            );
            (StatusCode::NOT_FOUND, "404").into_response()
        }
    }
}
