//! LabFlow Server Library
//!
//! The server binary is in main.rs; everything it wires together lives here
//! so integration tests can drive the pipeline and the router directly.
//!
//! # Modules
//!
//! - `document`: Upload, kind and extracted-text types
//! - `mupdf`: MuPDF access (text layer, page rasterization)
//! - `ocr`: Image normalization and Tesseract recognition
//! - `extract`: Direct-text extraction and strategy selection
//! - `structuring`: Language-model structuring of report text
//! - `batch`: Per-request fan-out over uploaded files

pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod mupdf;
pub mod ocr;
pub mod routes;
pub mod state;
pub mod structuring;
