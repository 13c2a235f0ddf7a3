use crate::error::FormFillError;
use crate::server::error::ApiError;
use axum::extract::Multipart;
use tracing::debug;

/// Multipart field carrying the questions document.
pub const QUESTIONS_FIELD: &str = "questions_pdf";
/// Multipart field carrying the data document.
pub const DATA_FIELD: &str = "data_pdf";

/// An uploaded file with its data and metadata.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Both documents of a fill request.
#[derive(Debug)]
pub struct FillUpload {
    pub questions: UploadedFile,
    pub data: UploadedFile,
}

/// Parse the fill form's multipart body.
///
/// A field submitted with zero bytes (a browser sends that when no file was
/// chosen) counts as missing. Unknown fields are drained and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<FillUpload, ApiError> {
    let mut questions: Option<UploadedFile> = None;
    let mut data: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let slot = match name.as_str() {
            QUESTIONS_FIELD => &mut questions,
            DATA_FIELD => &mut data,
            _ => {
                field.bytes().await.map_err(|e| {
                    ApiError::BadUpload(format!("Failed to read field {}: {}", name, e))
                })?;
                debug!("Ignored unknown form field {}", name);
                continue;
            }
        };

        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(format!("Failed to read {}: {}", name, e)))?
            .to_vec();
        debug!("Received {} ({}, {} bytes)", name, filename, bytes.len());

        if !bytes.is_empty() {
            *slot = Some(UploadedFile {
                filename,
                data: bytes,
            });
        }
    }

    let questions = questions.ok_or_else(|| missing(QUESTIONS_FIELD))?;
    let data = data.ok_or_else(|| missing(DATA_FIELD))?;
    Ok(FillUpload { questions, data })
}

fn missing(field: &str) -> ApiError {
    ApiError::Fill(FormFillError::MissingUpload {
        field: field.to_string(),
    })
}
