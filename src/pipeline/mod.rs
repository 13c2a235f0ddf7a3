//! Pipeline stages for filling a question form from a data document.
//!
//! Each submodule implements exactly one step, so each is testable on its own
//! and the pdfium-backed stages can be swapped for in-memory fakes.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ questions ──▶ context ──▶ inference ──▶ answer ──▶ layout ──▶ render
//! (pdfium)    (filter)     (truncate)  (HTTP+retry)  (loop)     (wrap)    (pdfium)
//! ```
//!
//! 1. [`extract`]: text layer of both uploads; `spawn_blocking` because
//!    pdfium is not async-safe
//! 2. [`questions`]: keep the lines that look like questions
//! 3. [`context`]: cut the data text to the character budget
//! 4. [`inference`]: one QA call with the retry state machine; the only
//!    stage with network I/O
//! 5. [`answer`]: ask every question in order with a pause between calls
//! 6. [`layout`]: word-wrap and paginate the Q/A pairs
//! 7. [`render`]: draw the layout into a new PDF

pub mod answer;
pub mod context;
pub mod extract;
pub mod inference;
pub mod layout;
pub mod questions;
pub mod render;
