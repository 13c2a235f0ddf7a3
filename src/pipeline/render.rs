//! PDF rendering: draw a [`DocumentLayout`] into a new PDF via pdfium.
//!
//! All positioning was decided by [`crate::pipeline::layout`]; this stage only
//! creates pages of the requested size and places one Helvetica text object
//! per line. Like extraction it runs inside `spawn_blocking`.

use crate::error::FormFillError;
use crate::pipeline::extract::bind_pdfium;
use crate::pipeline::layout::DocumentLayout;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use tracing::debug;

/// Produces the bytes of the answers document.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    async fn write_pdf(&self, layout: &DocumentLayout) -> Result<Vec<u8>, FormFillError>;
}

/// [`DocumentWriter`] backed by pdfium.
///
/// Text is drawn with the built-in Helvetica font, which only carries the
/// WinAnsi (Latin-1) glyph set. Accented Latin answers render as-is;
/// characters outside that set (CJK, Cyrillic, emoji) come out as missing
/// glyphs. Embedding a TrueType font through `fonts_mut().load_true_type_from_bytes`
/// lifts the limit.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumWriter;

#[async_trait]
impl DocumentWriter for PdfiumWriter {
    async fn write_pdf(&self, layout: &DocumentLayout) -> Result<Vec<u8>, FormFillError> {
        let layout = layout.clone();
        tokio::task::spawn_blocking(move || render_blocking(&layout))
            .await
            .map_err(|e| FormFillError::Internal(format!("Render task panicked: {}", e)))?
    }
}

fn render_failed(context: &str, e: PdfiumError) -> FormFillError {
    FormFillError::RenderFailed(format!("{}: {:?}", context, e))
}

fn render_blocking(layout: &DocumentLayout) -> Result<Vec<u8>, FormFillError> {
    let pdfium = bind_pdfium()?;

    let mut document = pdfium
        .create_new_pdf()
        .map_err(|e| render_failed("create document", e))?;
    let font = document.fonts_mut().helvetica();
    let font_size = PdfPoints::new(layout.font_size);

    for (idx, page_layout) in layout.pages.iter().enumerate() {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                PdfPoints::new(layout.page_width),
                PdfPoints::new(layout.page_height),
            ))
            .map_err(|e| render_failed(&format!("create page {}", idx + 1), e))?;

        for line in &page_layout.lines {
            if line.text.is_empty() {
                continue;
            }
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(line.x),
                    PdfPoints::new(line.y),
                    &line.text,
                    font,
                    font_size,
                )
                .map_err(|e| render_failed(&format!("text on page {}", idx + 1), e))?;
        }
        debug!("Rendered page {} ({} lines)", idx + 1, page_layout.lines.len());
    }

    document
        .save_to_bytes()
        .map_err(|e| render_failed("serialise document", e))
}
