//! HTTP error mapping.

use crate::error::FormFillError;
use crate::server::template;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

/// Error returned by the fill handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The multipart body itself could not be read.
    #[error("Invalid upload: {0}")]
    BadUpload(String),

    #[error(transparent)]
    Fill(#[from] FormFillError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Fill(e) if e.is_user_error() => StatusCode::BAD_REQUEST,
            ApiError::Fill(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            error!("Fill failed: {}", message);
        } else {
            warn!("Rejected upload: {}", message);
        }
        (status, template::render_error(&message)).into_response()
    }
}
