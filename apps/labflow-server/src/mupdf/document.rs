//! In-memory PDF document wrapper for MuPDF
//!
//! # Design
//!
//! 1. Validates the PDF header before handing bytes to MuPDF
//! 2. Caches the page count once at open time
//! 3. Loads pages lazily, one per operation, so a broken page only fails
//!    the operation that touched it

use image::DynamicImage;
use mupdf::Document;

use crate::document::{DocumentError, DocumentResult};

use super::page::{extract_plain_text, render_page_rgb};

/// MIME type handed to MuPDF when opening uploads
pub const PDF_MIME: &str = "application/pdf";

/// Header search window; readers accept `%PDF` anywhere in the first KiB
const HEADER_WINDOW: usize = 1024;

/// Check whether `data` carries a PDF header
pub fn looks_like_pdf(data: &[u8]) -> bool {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    window.windows(4).any(|w| w == b"%PDF")
}

/// An opened PDF
pub struct PdfDocument {
    doc: Document,
    page_count: usize,
}

impl PdfDocument {
    /// Open a PDF from bytes
    pub fn from_bytes(data: &[u8]) -> DocumentResult<Self> {
        if !looks_like_pdf(data) {
            return Err(DocumentError::UnsupportedFormat(
                "missing %PDF header".into(),
            ));
        }

        let doc = Document::from_bytes(data, PDF_MIME)?;
        let page_count = usize::try_from(doc.page_count()?)
            .map_err(|e| DocumentError::ParseError(format!("invalid page count: {}", e)))?;

        Ok(Self { doc, page_count })
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Load a page, checking bounds first
    fn load_page(&self, index: usize) -> DocumentResult<mupdf::Page> {
        if index >= self.page_count {
            return Err(DocumentError::PageNotFound(index));
        }
        let page = self.doc.load_page(index as i32)?;
        Ok(page)
    }

    /// Embedded text of one page (0-indexed)
    pub fn page_text(&self, index: usize) -> DocumentResult<String> {
        let page = self.load_page(index)?;
        extract_plain_text(&page)
    }

    /// Rasterize one page (0-indexed) at `dpi` into an RGB image
    pub fn render_page(&self, index: usize, dpi: u32) -> DocumentResult<DynamicImage> {
        let page = self.load_page(index)?;
        render_page_rgb(&page, dpi)
    }
}
