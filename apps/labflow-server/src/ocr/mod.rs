//! OCR Module
//!
//! Image-based text acquisition for scanned lab reports and photos.
//!
//! - [`normalize`] turns any raster into a denoised black/white page
//! - [`TextRecognizer`] runs the OCR engine (Tesseract CLI in production)
//! - [`OcrExtractor`] drives the per-document flow: multi-page rasterization
//!   first, single-image decode as fallback, per-page failure isolation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labflow_server::ocr::{OcrExtractor, OcrSettings};
//!
//! let extractor = OcrExtractor::with_tesseract(&OcrSettings::default());
//! let extracted = extractor.extract(&bytes);
//! if extracted.is_empty() {
//!     // nothing recognized
//! }
//! ```

mod extractor;
mod normalize;
mod provider;
mod types;

pub use extractor::{MupdfRasterizer, OcrExtractor, PageImages, PageRasterizer};
pub use normalize::{normalize, NormalizedImage};
pub use provider::{TesseractProvider, TextRecognizer};
pub use types::{OcrError, OcrSettings};

#[cfg(test)]
pub use provider::MockRecognizer;
