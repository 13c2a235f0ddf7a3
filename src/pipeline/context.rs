//! Context preparation: the data document's text, cut to a character budget.

use crate::error::FormFillError;

/// Reference text sent alongside every question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    text: String,
    original_chars: usize,
    truncated: bool,
}

impl Context {
    /// Wrap `text` without any truncation.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let original_chars = text.chars().count();
        Self {
            text,
            original_chars,
            truncated: false,
        }
    }

    /// Keep the first `max_chars` characters of `text`, appending `marker`
    /// when anything was cut.
    ///
    /// Counts Unicode scalar values, never bytes, so a cut never lands inside
    /// a multi-byte character.
    pub fn truncated(text: impl Into<String>, max_chars: usize, marker: &str) -> Self {
        let text = text.into();
        let original_chars = text.chars().count();
        if original_chars <= max_chars {
            return Self {
                text,
                original_chars,
                truncated: false,
            };
        }

        let cut = text
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        let mut kept = String::with_capacity(cut + marker.len());
        kept.push_str(&text[..cut]);
        kept.push_str(marker);

        Self {
            text: kept,
            original_chars,
            truncated: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Character count of the text before truncation.
    pub fn original_chars(&self) -> usize {
        self.original_chars
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Reject a data document whose trimmed text is shorter than `min_chars`.
pub fn ensure_sufficient(text: &str, min_chars: usize) -> Result<(), FormFillError> {
    let chars = text.trim().chars().count();
    if chars < min_chars {
        return Err(FormFillError::InsufficientContext {
            chars,
            min: min_chars,
        });
    }
    Ok(())
}
