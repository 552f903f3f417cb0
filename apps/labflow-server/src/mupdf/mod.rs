//! Low-level MuPDF Wrapper
//!
//! Opens uploaded PDFs from memory and exposes the two operations the
//! extraction pipeline needs: reading a page's embedded text layer and
//! rasterizing a page for OCR.
//!
//! # Thread Safety
//!
//! MuPDF's `fz_context` is **NOT thread-safe**. A [`PdfDocument`] is opened,
//! used and dropped on a single blocking worker thread; it is never shared
//! across threads or across uploads.
//!
//! # Usage
//!
//! ```rust,ignore
//! use labflow_server::mupdf::PdfDocument;
//!
//! let doc = PdfDocument::from_bytes(&pdf_bytes)?;
//! for index in 0..doc.page_count() {
//!     let text = doc.page_text(index)?;
//!     let image = doc.render_page(index, 300)?;
//! }
//! ```

mod document;
mod page;

pub use document::{looks_like_pdf, PdfDocument, PDF_MIME};
pub use page::{extract_plain_text, render_page_rgb, points_to_scale};
