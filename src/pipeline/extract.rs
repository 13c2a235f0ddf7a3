//! Text extraction: uploaded PDF bytes → plain text via pdfium.
//!
//! ## Why a trait?
//!
//! pdfium is a dynamically loaded C++ library that may not be present on a
//! developer machine or CI runner. Hiding it behind [`DocumentReader`] lets
//! the fill pipeline and the HTTP layer be tested with an in-memory reader,
//! while [`PdfiumReader`] is the production implementation.
//!
//! ## Why spawn_blocking?
//!
//! pdfium keeps thread-local state and its calls are blocking and CPU-bound.
//! Each extraction binds the library, loads the document from the byte slice
//! and walks the pages on a blocking-pool thread so Tokio workers never stall.

use crate::error::FormFillError;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Environment variable naming an explicit pdfium library to bind.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Reads the text layer of an uploaded document.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    /// Extract every page's text, pages joined by `\n`.
    ///
    /// `document` names the upload ("questions" or "data") for error messages.
    async fn extract_text(&self, document: &str, bytes: &[u8]) -> Result<String, FormFillError>;
}

/// [`DocumentReader`] backed by pdfium.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumReader;

#[async_trait]
impl DocumentReader for PdfiumReader {
    async fn extract_text(&self, document: &str, bytes: &[u8]) -> Result<String, FormFillError> {
        ensure_pdf_magic(document, bytes)?;

        let name = document.to_string();
        let owned = bytes.to_vec();
        tokio::task::spawn_blocking(move || extract_text_blocking(&name, &owned))
            .await
            .map_err(|e| FormFillError::Internal(format!("Extraction task panicked: {}", e)))?
    }
}

/// Reject bytes that do not start with the `%PDF` signature before pdfium
/// ever sees them.
pub fn ensure_pdf_magic(document: &str, bytes: &[u8]) -> Result<(), FormFillError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(FormFillError::NotAPdf {
            document: document.to_string(),
        });
    }
    Ok(())
}

/// Bind to a pdfium library.
///
/// Resolution order: `PDFIUM_LIB_PATH`, then a platform library in the
/// working directory, then the system loader path.
pub fn bind_pdfium() -> Result<Pdfium, FormFillError> {
    if let Ok(path) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !path.is_empty() {
            debug!("Binding pdfium from {}={}", PDFIUM_LIB_PATH_ENV, path);
            return Pdfium::bind_to_library(&path)
                .map(Pdfium::new)
                .map_err(|e| FormFillError::PdfiumBindingFailed(format!("'{}': {:?}", path, e)));
        }
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| FormFillError::PdfiumBindingFailed(format!("{:?}", e)))
}

fn extract_text_blocking(document: &str, bytes: &[u8]) -> Result<String, FormFillError> {
    let pdfium = bind_pdfium()?;

    let pdf = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| FormFillError::DocumentParse {
            document: document.to_string(),
            detail: format!("{:?}", e),
        })?;

    let pages = pdf.pages();
    let mut texts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| FormFillError::DocumentParse {
            document: document.to_string(),
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        texts.push(text.all());
    }

    let joined = texts.join("\n");
    info!(
        "Extracted {} characters from {} page(s) of the {} document",
        joined.chars().count(),
        texts.len(),
        document
    );
    Ok(joined)
}
