// src/server.rs

//! HTTP surface: the generated feed and a liveness endpoint.
//!
//! Serving stays reachable independent of scrape health; a bad cycle
//! only means the feed file fails to update.

use std::path::PathBuf;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

/// Shared state for the feed routes.
#[derive(Clone)]
pub struct AppState {
    feed_path: PathBuf,
}

/// Build the service router.
pub fn router(feed_path: PathBuf) -> Router {
    Router::new()
        .route("/", get(serve_feed))
        .route("/status", get(status))
        .with_state(AppState { feed_path })
}

/// GET / - the current feed document, 404 until first generated.
async fn serve_feed(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.feed_path).await {
        Ok(bytes) => (
            [(
                header::CONTENT_TYPE,
                "application/rss+xml; charset=utf-8",
            )],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Feed not generated yet").into_response()
        }
        Err(e) => {
            log::error!("Failed to read feed file: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET /status - plain liveness message.
async fn status() -> &'static str {
    "Scraper is running"
}
