//! HTTP surface: upload form, fill endpoint and health check.
//!
//! ```text
//! GET  /           upload form (questions_pdf + data_pdf)
//! POST /fill-form  multipart → application/pdf attachment
//! GET  /health     {"status":"ok"}
//! ```
//!
//! Uploads are capped at [`MAX_UPLOAD_BYTES`]. Errors come back as a small
//! HTML fragment: `400` when the uploads are at fault, `500` otherwise.

pub mod error;
pub mod handlers;
pub mod state;
pub mod template;
pub mod upload;

pub use error::ApiError;
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Upload body limit for `POST /fill-form`.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/fill-form", post(handlers::fill_form))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
