//! Text acquisition
//!
//! Chooses between the embedded text layer and OCR for each uploaded
//! document.
//!
//! | declared kind | strategy |
//! |---|---|
//! | `pdf` | direct text; OCR when the layer is missing or too sparse |
//! | `jpeg` / `png` / `bmp` / `tiff` | OCR |
//! | anything else | OCR as a last resort |

mod direct;
mod selector;

pub use direct::{
    collect_direct_text, DirectText, DirectTextExtractor, PageTextSource, MIN_CHARS_PER_PAGE,
};
pub use selector::{DirectTextSource, ExtractionPipeline, OcrTextSource};
