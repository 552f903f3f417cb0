//! Extraction strategy selection

use std::sync::Arc;

use tracing::{info, warn};

use crate::document::{DocumentKind, ExtractedText};
use crate::ocr::{OcrExtractor, OcrSettings};

use super::direct::{DirectText, DirectTextExtractor};

/// Source of embedded-layer text
pub trait DirectTextSource: Send + Sync {
    fn extract_direct(&self, bytes: &[u8]) -> DirectText;
}

/// Source of OCR text; empty text is terminal
pub trait OcrTextSource: Send + Sync {
    fn extract_ocr(&self, bytes: &[u8]) -> ExtractedText;
}

impl DirectTextSource for DirectTextExtractor {
    fn extract_direct(&self, bytes: &[u8]) -> DirectText {
        self.extract(bytes)
    }
}

impl OcrTextSource for OcrExtractor {
    fn extract_ocr(&self, bytes: &[u8]) -> ExtractedText {
        self.extract(bytes)
    }
}

/// Picks direct text or OCR per document
#[derive(Clone)]
pub struct ExtractionPipeline {
    direct: Arc<dyn DirectTextSource>,
    ocr: Arc<dyn OcrTextSource>,
}

impl ExtractionPipeline {
    pub fn new(direct: Arc<dyn DirectTextSource>, ocr: Arc<dyn OcrTextSource>) -> Self {
        Self { direct, ocr }
    }

    /// MuPDF direct text with MuPDF + Tesseract OCR fallback
    pub fn with_defaults(settings: &OcrSettings) -> Self {
        Self::new(
            Arc::new(DirectTextExtractor::new()),
            Arc::new(OcrExtractor::with_tesseract(settings)),
        )
    }

    /// Extract the text of a document according to its declared kind.
    ///
    /// Blocking; run on a blocking worker thread. Empty text means every
    /// strategy failed.
    pub fn select_and_extract(&self, bytes: &[u8], kind: &DocumentKind) -> ExtractedText {
        match kind {
            DocumentKind::Pdf => {
                info!("PDF detected, trying direct text extraction");
                match self.direct.extract_direct(bytes) {
                    DirectText::Usable(text) => {
                        info!(chars = text.trimmed_len(), "Direct text extraction succeeded");
                        text
                    }
                    DirectText::Sparse { chars, pages } => {
                        info!(
                            chars,
                            pages, "Text layer too sparse, falling back to OCR"
                        );
                        self.ocr.extract_ocr(bytes)
                    }
                    DirectText::Unreadable(e) => {
                        info!("Direct text extraction failed ({}), falling back to OCR", e);
                        self.ocr.extract_ocr(bytes)
                    }
                }
            }
            DocumentKind::Image(image_kind) => {
                info!(kind = ?image_kind, "Image detected, using OCR");
                self.ocr.extract_ocr(bytes)
            }
            DocumentKind::Unknown(_) => {
                warn!(kind = %kind, "Unsupported file kind, trying OCR as last resort");
                self.ocr.extract_ocr(bytes)
            }
        }
    }
}
