//! Error types for the pdf-form-filler library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FormFillError`]: **Fatal**: the fill cannot proceed at all (an upload
//!   is not a PDF, no questions were found, pdfium is missing). Returned as
//!   `Err(FormFillError)` from [`crate::fill::FormFiller`] and mapped to an
//!   HTTP status by the server.
//!
//! * [`InferenceError`]: **Non-fatal**: a single question could not be
//!   answered (endpoint kept loading, rate limit never cleared, empty answer).
//!   Stored inside [`crate::output::QaPair`] next to the placeholder answer so
//!   the rest of the batch is unaffected.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-form-filler library.
///
/// Per-question failures use [`InferenceError`] and are stored in
/// [`crate::output::QaPair`] rather than propagated here.
#[derive(Debug, Error)]
pub enum FormFillError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// A required multipart field was absent from the upload.
    #[error("Missing upload field '{field}'")]
    MissingUpload { field: String },

    /// The upload does not start with the `%PDF` magic bytes.
    #[error("The {document} document is not a PDF file")]
    NotAPdf { document: String },

    /// pdfium rejected the bytes (corrupt xref, truncated file, encryption).
    #[error("Could not read the {document} document: {detail}")]
    DocumentParse { document: String, detail: String },

    /// A local input file could not be read (CLI only).
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The questions document contains no line that looks like a question.
    #[error("No questions found in the questions document. Questions must contain a '?'.")]
    EmptyQuestionSet,

    /// The data document has too little text to answer anything from.
    #[error("Insufficient context: the data document contains {chars} characters of text (need at least {min})")]
    InsufficientContext { chars: usize, min: usize },

    // ── Output errors ─────────────────────────────────────────────────────
    /// pdfium failed while building the answers document.
    #[error("Failed to render the answers document: {0}")]
    RenderFailed(String),

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the binary (working directory).\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FormFillError {
    /// `true` when the error was caused by what the user uploaded.
    ///
    /// The server answers these with `400 Bad Request`; everything else is a
    /// `500 Internal Server Error`.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            FormFillError::MissingUpload { .. }
                | FormFillError::NotAPdf { .. }
                | FormFillError::DocumentParse { .. }
                | FormFillError::InputReadFailed { .. }
                | FormFillError::EmptyQuestionSet
                | FormFillError::InsufficientContext { .. }
        )
    }
}

/// A non-fatal error for a single question.
///
/// The question still appears in the output, paired with the configured
/// placeholder answer.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum InferenceError {
    /// The endpoint answered successfully but the `answer` field was empty
    /// or missing.
    #[error("endpoint returned an empty answer")]
    EmptyAnswer,

    /// Every attempt hit a transient condition (model loading, rate limit,
    /// timeout).
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    /// The endpoint returned a non-retryable status.
    #[error("endpoint returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Connection refused, DNS failure, TLS error; anything but a timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The success body was not the JSON shape we expect.
    #[error("could not decode endpoint response: {0}")]
    Decode(String),
}
