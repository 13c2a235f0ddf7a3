use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::server::template;
use crate::server::upload::parse_multipart;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::info;

/// Filename offered to the browser for the answers document.
pub const OUTPUT_FILENAME: &str = "filled_form.pdf";

pub async fn index() -> Html<&'static str> {
    template::render_index()
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /fill-form`: answer the questions PDF from the data PDF.
pub async fn fill_form(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = parse_multipart(multipart).await?;
    info!(
        "Fill request: questions={} ({} bytes), data={} ({} bytes)",
        upload.questions.filename,
        upload.questions.data.len(),
        upload.data.filename,
        upload.data.data.len()
    );

    let output = state
        .filler
        .fill(&upload.questions.data, &upload.data.data)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", OUTPUT_FILENAME),
            ),
        ],
        output.pdf,
    )
        .into_response())
}
