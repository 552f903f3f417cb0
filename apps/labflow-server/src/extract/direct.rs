//! Direct (embedded text layer) extraction

use tracing::{info, warn};

use crate::document::{
    page_marker, DocumentError, DocumentResult, ExtractedText, ExtractionMethod,
};
use crate::mupdf::PdfDocument;

/// Average characters per page a real text layer must exceed
pub const MIN_CHARS_PER_PAGE: usize = 100;

/// Page-by-page access to a document's text layer
pub trait PageTextSource {
    fn page_count(&self) -> usize;

    /// Text of one page (0-indexed)
    fn page_text(&self, index: usize) -> DocumentResult<String>;
}

impl PageTextSource for PdfDocument {
    fn page_count(&self) -> usize {
        PdfDocument::page_count(self)
    }

    fn page_text(&self, index: usize) -> DocumentResult<String> {
        PdfDocument::page_text(self, index)
    }
}

/// Outcome of a direct extraction attempt
#[derive(Debug)]
pub enum DirectText {
    /// Text layer dense enough to trust
    Usable(ExtractedText),
    /// Parsed, but too little text (scanned PDF, watermark only)
    Sparse { chars: usize, pages: usize },
    /// Not parseable as a document with a text layer
    Unreadable(DocumentError),
}

impl DirectText {
    /// Usable text, or `None` when OCR should take over
    pub fn usable(self) -> Option<ExtractedText> {
        match self {
            Self::Usable(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Usable(_))
    }
}

/// Join the text of every page, skipping pages that fail, and apply the
/// density heuristic.
pub fn collect_direct_text(source: &dyn PageTextSource) -> DirectText {
    let pages = source.page_count();
    let mut text = String::new();

    for index in 0..pages {
        let page_number = index + 1;
        match source.page_text(index) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push_str(&page_marker(ExtractionMethod::Direct, page_number));
            }
            Err(e) => {
                warn!(page = page_number, "Failed to extract text from page: {}", e);
            }
        }
    }

    let chars = text.trim().chars().count();
    let usable = chars > MIN_CHARS_PER_PAGE * pages;
    info!(pages, chars, usable, "Direct text extraction finished");

    if usable {
        DirectText::Usable(ExtractedText::new(ExtractionMethod::Direct, text))
    } else {
        DirectText::Sparse { chars, pages }
    }
}

/// MuPDF-backed direct text extractor
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectTextExtractor;

impl DirectTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Read the embedded text layer of a PDF
    pub fn extract(&self, bytes: &[u8]) -> DirectText {
        match PdfDocument::from_bytes(bytes) {
            Ok(doc) => {
                info!(pages = doc.page_count(), "Reading embedded text layer");
                collect_direct_text(&doc)
            }
            Err(e) => {
                warn!("Failed to open document for direct text: {}", e);
                DirectText::Unreadable(e)
            }
        }
    }
}
