//! Question extraction: pick the question lines out of a document's text.
//!
//! A line is a question iff it contains `?` and its trimmed length is
//! strictly greater than the configured minimum. Order and duplicates are
//! preserved; the caller decides what an empty result means.

use tracing::debug;

/// A single question taken from one line of the questions document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    raw: String,
    text: String,
}

impl Question {
    /// Build a question from a source line, keeping both the raw and the
    /// trimmed form.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let text = raw.trim().to_string();
        Self { raw, text }
    }

    /// The line exactly as extracted, surrounding whitespace included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The trimmed question text sent to the endpoint.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Return `true` when a line should be treated as a question.
pub fn is_question(line: &str, min_len: usize) -> bool {
    line.contains('?') && line.trim().chars().count() > min_len
}

/// Extract the ordered question lines from `text`.
pub fn extract_questions(text: &str, min_len: usize) -> Vec<Question> {
    let questions: Vec<Question> = text
        .lines()
        .filter(|line| is_question(line, min_len))
        .map(Question::new)
        .collect();
    debug!(
        "Extracted {} questions from {} lines",
        questions.len(),
        text.lines().count()
    );
    questions
}
