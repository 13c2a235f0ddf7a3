//! Page layout for the answers document.
//!
//! Pure geometry, no pdfium: every question/answer pair is word-wrapped and
//! assigned a position, and pages are broken whenever the vertical cursor
//! drops below the bottom margin. [`crate::pipeline::render`] then simply
//! draws what this module decided, which keeps pagination testable without a
//! PDF engine.

use crate::config::LayoutConfig;
use crate::output::QaPair;
use serde::{Deserialize, Serialize};

/// One line of text at a fixed baseline position (PDF points, origin at the
/// bottom-left corner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub lines: Vec<TextLine>,
}

/// The complete, paginated answers document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub font_size: f32,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Runs of whitespace collapse to one space; a word longer than `width` is
/// split across lines. Always returns at least one (possibly empty) line.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        // Hard-split words that can never fit on a line of their own.
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lay out every pair, in order, onto as many pages as needed.
pub fn layout_pairs(pairs: &[QaPair], config: &LayoutConfig) -> DocumentLayout {
    let mut cursor = Cursor::new(config);

    for pair in pairs {
        let question = wrap(&format!("Q: {}", pair.question), config.wrap_width);
        for (i, segment) in question.into_iter().enumerate() {
            let x = if i == 0 {
                config.question_indent
            } else {
                config.answer_indent
            };
            cursor.place(x, segment);
        }

        for segment in wrap(&format!("A: {}", pair.answer), config.wrap_width) {
            cursor.place(config.answer_indent, segment);
        }

        cursor.advance(config.pair_gap);
    }

    DocumentLayout {
        page_width: config.page_width,
        page_height: config.page_height,
        font_size: config.font_size,
        pages: cursor.pages,
    }
}

/// Vertical cursor that opens a new page once it falls below the margin.
struct Cursor<'a> {
    config: &'a LayoutConfig,
    y: f32,
    pages: Vec<PageLayout>,
}

impl<'a> Cursor<'a> {
    fn new(config: &'a LayoutConfig) -> Self {
        Self {
            config,
            y: config.page_height - config.top_margin,
            pages: vec![PageLayout::default()],
        }
    }

    fn place(&mut self, x: f32, text: String) {
        if self.y < self.config.bottom_margin {
            self.pages.push(PageLayout::default());
            self.y = self.config.page_height - self.config.top_margin;
        }
        let y = self.y;
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(TextLine { x, y, text });
        }
        self.y -= self.config.line_height;
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(q: &str, a: &str) -> QaPair {
        QaPair {
            question: q.into(),
            answer: a.into(),
            error: None,
        }
    }

    #[test]
    fn wrap_short_text_is_single_line() {
        assert_eq!(wrap("Q: What is your name?", 80), vec!["Q: What is your name?"]);
    }

    #[test]
    fn wrap_breaks_on_word_boundaries() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 15);
        assert_eq!(lines, vec!["the quick brown", "fox jumps over", "the lazy dog"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 15));
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap("go https://example.com/a/very/long/path end", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10), "{lines:?}");
        assert_eq!(lines.concat().replace(' ', ""), "gohttps://example.com/a/very/long/pathend");
    }

    #[test]
    fn wrap_empty_text_yields_one_empty_line() {
        assert_eq!(wrap("   ", 80), vec![String::new()]);
    }

    #[test]
    fn wrap_preserves_words_in_order() {
        let text = "Senior Software Engineer at Tech Innovations Inc. (2021-Present) leading a team of five engineers on distributed systems";
        let lines = wrap(text, 40);
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn question_outdented_relative_to_answer() {
        let config = LayoutConfig::default();
        let long_q = "What are the applicant's work experience details including company names, dates and responsibilities?";
        let doc = layout_pairs(&[pair(long_q, "Five years.")], &config);
        let lines = &doc.pages[0].lines;

        assert!(lines.len() >= 3);
        assert_eq!(lines[0].x, config.question_indent);
        assert!(lines[0].text.starts_with("Q: "));
        assert!(lines[1..].iter().all(|l| l.x == config.answer_indent));
        assert!(lines.last().unwrap().text.starts_with("A: "));
        assert!(config.question_indent < config.answer_indent);
    }

    #[test]
    fn lines_move_down_the_page() {
        let doc = layout_pairs(&[pair("A?", "a"), pair("B?", "b")], &LayoutConfig::default());
        let ys: Vec<f32> = doc.pages[0].lines.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![742.0, 727.0, 697.0, 682.0]);
    }

    #[test]
    fn empty_input_is_a_single_blank_page() {
        let doc = layout_pairs(&[], &LayoutConfig::default());
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.line_count(), 0);
    }

    #[test]
    fn fifty_pairs_paginate_within_capacity() {
        let config = LayoutConfig::default();
        let pairs: Vec<QaPair> = (1..=50)
            .map(|i| {
                pair(
                    &format!("{i}. What is the value of field number {i} on this application form?"),
                    &format!("The value recorded for field {i} in the applicant information document, which is deliberately long enough to wrap."),
                )
            })
            .collect();

        let doc = layout_pairs(&pairs, &config);
        let capacity = config.lines_per_page();

        assert!(doc.page_count() > 1, "expected multiple pages");
        for (i, page) in doc.pages.iter().enumerate() {
            assert!(!page.lines.is_empty(), "page {i} is empty");
            assert!(page.lines.len() <= capacity, "page {i} has {} lines", page.lines.len());
            for line in &page.lines {
                assert!(line.y >= config.bottom_margin, "page {i} line below margin: {line:?}");
                assert!(line.y <= config.page_height - config.top_margin);
                assert!(line.text.chars().count() <= config.wrap_width);
            }
        }

        // Every question appears exactly once, in order.
        let questions: Vec<&str> = doc
            .pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .filter(|l| l.text.starts_with("Q: "))
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(questions.len(), 50);
        for (i, q) in questions.iter().enumerate() {
            assert!(q.starts_with(&format!("Q: {}. ", i + 1)), "{q}");
        }
    }
}
