//! Fill entry points: two PDFs in, one answers PDF out.
//!
//! [`FormFiller`] owns every collaborator a fill needs (text reader, PDF
//! writer, inference client, configuration) and is cheap to share behind an
//! `Arc`, which is how the HTTP server holds it. A fill returns `Err` only for
//! fatal problems with the uploads or the PDF engine; a question the endpoint
//! could not answer is recorded in its [`QaPair`] and never aborts the batch.

use crate::config::FillConfig;
use crate::error::FormFillError;
use crate::output::{FillOutput, FillStats, QaPair};
use crate::pipeline::answer::answer_questions;
use crate::pipeline::context::ensure_sufficient;
use crate::pipeline::extract::{DocumentReader, PdfiumReader};
use crate::pipeline::inference::InferenceClient;
use crate::pipeline::layout::layout_pairs;
use crate::pipeline::questions::{extract_questions, Question};
use crate::pipeline::render::{DocumentWriter, PdfiumWriter};
use crate::progress::ProgressCallback;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Name of the questions upload, used in error messages.
pub const QUESTIONS_DOCUMENT: &str = "questions";
/// Name of the data upload, used in error messages.
pub const DATA_DOCUMENT: &str = "data";

/// Turns a questions PDF and a data PDF into an answers PDF.
#[derive(Clone)]
pub struct FormFiller {
    reader: Arc<dyn DocumentReader>,
    writer: Arc<dyn DocumentWriter>,
    client: InferenceClient,
    config: FillConfig,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for FormFiller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFiller")
            .field("config", &self.config)
            .field("client", &self.client)
            .field("progress", &self.progress.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl FormFiller {
    /// Production filler: pdfium for both PDF stages, HTTP for inference.
    pub fn new(config: FillConfig) -> Result<Self, FormFillError> {
        let client = InferenceClient::new(&config)?;
        Ok(Self::with_parts(
            config,
            Arc::new(PdfiumReader),
            Arc::new(PdfiumWriter),
            client,
        ))
    }

    /// Assemble a filler from explicit collaborators.
    pub fn with_parts(
        config: FillConfig,
        reader: Arc<dyn DocumentReader>,
        writer: Arc<dyn DocumentWriter>,
        client: InferenceClient,
    ) -> Self {
        Self {
            reader,
            writer,
            client,
            config,
            progress: None,
        }
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Fill from in-memory PDF bytes.
    ///
    /// # Errors
    /// Fatal errors only:
    /// - either upload is not a readable PDF
    /// - the questions document has no question lines (checked before any
    ///   remote call)
    /// - the data document has too little text
    /// - pdfium could not be bound or failed to render
    pub async fn fill(
        &self,
        questions_pdf: &[u8],
        data_pdf: &[u8],
    ) -> Result<FillOutput, FormFillError> {
        let total_start = Instant::now();

        // ── Step 1: Questions ────────────────────────────────────────────
        let extract_start = Instant::now();
        let questions_text = self
            .reader
            .extract_text(QUESTIONS_DOCUMENT, questions_pdf)
            .await?;
        let questions = extract_questions(&questions_text, self.config.min_question_len);
        if questions.is_empty() {
            return Err(FormFillError::EmptyQuestionSet);
        }
        info!("Found {} questions", questions.len());

        // ── Step 2: Context ──────────────────────────────────────────────
        let data_text = self.reader.extract_text(DATA_DOCUMENT, data_pdf).await?;
        ensure_sufficient(&data_text, self.config.min_context_chars)?;
        let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
        debug!(
            "Extracted both documents in {}ms ({} context chars)",
            extract_duration_ms,
            data_text.chars().count()
        );

        if let Some(ref cb) = self.progress {
            cb.on_fill_start(questions.len());
        }

        // ── Step 3: Answers ──────────────────────────────────────────────
        let inference_start = Instant::now();
        let texts: Vec<&str> = questions.iter().map(Question::text).collect();
        let (pairs, context) = answer_questions(
            &self.client,
            &texts,
            &data_text,
            &self.config,
            self.progress.as_ref(),
        )
        .await;
        let inference_duration_ms = inference_start.elapsed().as_millis() as u64;

        // ── Step 4: Render ───────────────────────────────────────────────
        let render_start = Instant::now();
        let layout = layout_pairs(&pairs, &self.config.layout);
        let pdf = self.writer.write_pdf(&layout).await?;
        let render_duration_ms = render_start.elapsed().as_millis() as u64;

        let answered = pairs.iter().filter(|p| p.is_answered()).count();
        let stats = FillStats {
            total_questions: pairs.len(),
            answered,
            unanswered: pairs.len() - answered,
            context_chars: context.original_chars(),
            context_truncated: context.is_truncated(),
            pages_rendered: layout.page_count(),
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            extract_duration_ms,
            inference_duration_ms,
            render_duration_ms,
        };

        info!(
            "Fill complete: {}/{} answered, {} page(s), {}ms total",
            stats.answered, stats.total_questions, stats.pages_rendered, stats.total_duration_ms
        );
        if let Some(ref cb) = self.progress {
            cb.on_fill_complete(stats.total_questions, stats.answered);
        }

        Ok(FillOutput { pdf, pairs, stats })
    }

    /// Fill from two PDF files on disk.
    pub async fn fill_files(
        &self,
        questions_path: impl AsRef<Path>,
        data_path: impl AsRef<Path>,
    ) -> Result<FillOutput, FormFillError> {
        let questions = read_input(questions_path.as_ref()).await?;
        let data = read_input(data_path.as_ref()).await?;
        self.fill(&questions, &data).await
    }

    /// Fill from two files and write the answers PDF to `output_path`.
    ///
    /// Uses atomic write (temp file in the target directory + rename) so a
    /// failed fill never leaves a partial PDF behind.
    pub async fn fill_to_file(
        &self,
        questions_path: impl AsRef<Path>,
        data_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<FillOutput, FormFillError> {
        let output = self.fill_files(questions_path, data_path).await?;
        write_atomic(output_path.as_ref(), output.pdf.clone()).await?;
        Ok(output)
    }
}

/// Pairs rendered for a fill, without the PDF; handy for JSON reports.
pub fn summarize(pairs: &[QaPair]) -> serde_json::Value {
    serde_json::json!(pairs
        .iter()
        .map(|p| serde_json::json!({
            "question": p.question,
            "answer": p.answer,
            "answered": p.is_answered(),
        }))
        .collect::<Vec<_>>())
}

async fn read_input(path: &Path) -> Result<Vec<u8>, FormFillError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| FormFillError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<(), FormFillError> {
    let path: PathBuf = path.to_path_buf();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| FormFillError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    tokio::task::spawn_blocking(move || {
        let fail = |source: std::io::Error| FormFillError::OutputWriteFailed {
            path: path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(fail)?;
        tmp.write_all(&bytes).map_err(fail)?;
        tmp.as_file().sync_all().map_err(fail)?;
        tmp.persist(&path).map_err(|e| fail(e.error))?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    })
    .await
    .map_err(|e| FormFillError::Internal(format!("Write task panicked: {}", e)))?
}
