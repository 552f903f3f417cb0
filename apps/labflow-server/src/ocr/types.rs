//! OCR Types

use crate::document::DocumentError;

/// Default Tesseract language (Portuguese lab reports)
pub const DEFAULT_LANGUAGE: &str = "por";

/// Tesseract page segmentation mode 6: a single uniform block of text
pub const PSM_SINGLE_BLOCK: u8 = 6;

/// Rasterization resolution used for OCR
pub const DEFAULT_DPI: u32 = 300;

/// OCR engine settings
#[derive(Debug, Clone)]
pub struct OcrSettings {
    /// Tesseract executable
    pub tesseract_cmd: String,
    /// Tesseract language code (ISO 639-2)
    pub language: String,
    /// Page segmentation mode
    pub page_seg_mode: u8,
    /// Rasterization DPI for multi-page documents
    pub dpi: u32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            page_seg_mode: PSM_SINGLE_BLOCK,
            dpi: DEFAULT_DPI,
        }
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("Failed to encode image for OCR: {0}")]
    ImageEncodingError(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("Failed to prepare page: {0}")]
    Document(#[from] DocumentError),
}
