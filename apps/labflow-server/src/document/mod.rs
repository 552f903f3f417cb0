//! Uploaded document abstraction
//!
//! Types shared by every stage of the extraction pipeline: the raw upload,
//! its declared kind, and the text produced from it.
//!
//! # Architecture
//!
//! ```text
//! RawDocument ──► ExtractionPipeline ──► ExtractedText ──► StructuringService
//!                   │            │
//!                   ▼            ▼
//!          DirectTextExtractor  OcrExtractor
//!            (MuPDF text)       (MuPDF raster / image decode + Tesseract)
//! ```

mod error;
mod types;

pub use error::{DocumentError, DocumentResult, Result};
pub use types::{
    page_marker, DocumentKind, ExtractedText, ExtractionMethod, ImageKind, RawDocument,
};
