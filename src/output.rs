//! Result types produced by a form fill.

use crate::error::InferenceError;
use serde::{Deserialize, Serialize};

/// Outcome of a single inference call.
///
/// Kept distinct from a plain `String` so an empty answer and a swallowed
/// transport error can never be confused with a real answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The endpoint produced a non-empty answer.
    Found(String),
    /// No usable answer; the reason is kept for logging and stats.
    NotFound(InferenceError),
}

impl Answer {
    pub fn is_found(&self) -> bool {
        matches!(self, Answer::Found(_))
    }

    /// The answer text, or `None` when nothing was found.
    pub fn text(&self) -> Option<&str> {
        match self {
            Answer::Found(text) => Some(text),
            Answer::NotFound(_) => None,
        }
    }
}

/// One question paired with the text rendered as its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    /// The answer, or the configured placeholder when `error` is set.
    pub answer: String,
    /// Why no answer was found, if that is the case.
    pub error: Option<InferenceError>,
}

impl QaPair {
    /// Build a pair from a question and an inference outcome.
    pub fn from_answer(question: impl Into<String>, answer: Answer, placeholder: &str) -> Self {
        let question = question.into();
        match answer {
            Answer::Found(text) => Self {
                question,
                answer: text,
                error: None,
            },
            Answer::NotFound(err) => Self {
                question,
                answer: placeholder.to_string(),
                error: Some(err),
            },
        }
    }

    pub fn is_answered(&self) -> bool {
        self.error.is_none()
    }
}

/// Counters describing a completed fill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillStats {
    /// Questions sent to the endpoint (empty ones are not counted).
    pub total_questions: usize,
    pub answered: usize,
    pub unanswered: usize,
    /// Characters of data-document text before truncation.
    pub context_chars: usize,
    pub context_truncated: bool,
    pub pages_rendered: usize,
    pub total_duration_ms: u64,
    pub extract_duration_ms: u64,
    pub inference_duration_ms: u64,
    pub render_duration_ms: u64,
}

/// Everything a fill produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillOutput {
    /// Serialised answers document.
    #[serde(skip)]
    pub pdf: Vec<u8>,
    pub pairs: Vec<QaPair>,
    pub stats: FillStats,
}
