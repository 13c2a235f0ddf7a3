//! # pdf-form-filler
//!
//! Answer the questions of one PDF from the text of another and render the
//! answers as a new PDF.
//!
//! ## Why this crate?
//!
//! Filling an application form from a résumé or a record sheet is mostly
//! lookup: every question has its answer somewhere in the data document. This
//! crate extracts the question lines from the first PDF, asks an extractive
//! question-answering model (by default `deepset/roberta-base-squad2` on the
//! Hugging Face inference API) to find each answer in the second PDF's text,
//! and writes the Q/A pairs into a fresh, paginated PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! questions.pdf ─┐
//!                ├─ 1. Extract    text layer via pdfium (spawn_blocking)
//! data.pdf ──────┘
//!                   2. Questions  keep lines containing '?'
//!                   3. Context    cut data text to 4,000 characters
//!                   4. Inference  one QA call per question, retry on 503/429/timeout
//!                   5. Layout     wrap + paginate Q/A pairs
//!                   6. Render     new PDF via pdfium
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_form_filler::{FillConfig, FormFiller};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from HF_API_TOKEN
//!     let filler = FormFiller::new(FillConfig::from_env())?;
//!     let output = filler
//!         .fill_to_file("questions.pdf", "data.pdf", "filled_form.pdf")
//!         .await?;
//!     eprintln!(
//!         "{}/{} questions answered",
//!         output.stats.answered, output.stats.total_questions
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## HTTP server
//!
//! [`server::router`] exposes the same fill as a multipart upload form; the
//! `form-filler serve` binary runs it.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `form-filler` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod fill;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{FillConfig, FillConfigBuilder, LayoutConfig};
pub use error::{FormFillError, InferenceError};
pub use fill::FormFiller;
pub use output::{Answer, FillOutput, FillStats, QaPair};
pub use pipeline::inference::{HttpTransport, InferenceClient, Sleeper, TokioSleeper, Transport};
pub use progress::{FillProgressCallback, NoopProgressCallback, ProgressCallback};
