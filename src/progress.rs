//! Progress-callback trait for per-question fill events.
//!
//! Inject an [`Arc<dyn FillProgressCallback>`] into
//! [`crate::fill::FormFiller::with_progress`] to receive events while the
//! answer pipeline works through the questions. With the default one second
//! pause and up to a minute of backoff per question, a fill of a long form
//! takes a while; the CLI uses these events to drive its progress bar.
//!
//! # Example
//!
//! ```rust
//! use pdf_form_filler::FillProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     answered: AtomicUsize,
//! }
//!
//! impl FillProgressCallback for CountingCallback {
//!     fn on_question_answered(&self, index: usize, total: usize, answer: &str) {
//!         self.answered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{index}/{total}: {answer}");
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called by the fill pipeline as it processes each question.
///
/// Implementations must be `Send + Sync`: a server shares one filler across
/// request tasks. All methods have default no-op implementations so callers
/// only override what they care about.
pub trait FillProgressCallback: Send + Sync {
    /// Called once, after extraction, with the number of questions to ask.
    fn on_fill_start(&self, total_questions: usize) {
        let _ = total_questions;
    }

    /// Called just before the request for a question is sent.
    ///
    /// # Arguments
    /// * `index`: 1-indexed question number
    /// * `total`: number of questions being asked
    /// * `question`: trimmed question text
    fn on_question_start(&self, index: usize, total: usize, question: &str) {
        let _ = (index, total, question);
    }

    /// Called when the endpoint produced an answer.
    fn on_question_answered(&self, index: usize, total: usize, answer: &str) {
        let _ = (index, total, answer);
    }

    /// Called when a question ends up with the placeholder answer.
    fn on_question_unanswered(&self, index: usize, total: usize, reason: &str) {
        let _ = (index, total, reason);
    }

    /// Called once after the answers document has been rendered.
    fn on_fill_complete(&self, total_questions: usize, answered: usize) {
        let _ = (total_questions, answered);
    }
}

/// A callback that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressCallback;

impl FillProgressCallback for NoopProgressCallback {}

/// Shared handle type stored by [`crate::fill::FormFiller`].
pub type ProgressCallback = Arc<dyn FillProgressCallback>;
