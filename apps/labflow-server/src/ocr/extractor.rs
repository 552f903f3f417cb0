//! OCR Extractor
//!
//! Per-document OCR flow:
//!
//! 1. Rasterize the bytes as a multi-page document (PDF) at the configured DPI
//! 2. Normalize and recognize every page in order, appending a page marker;
//!    a failing page is logged and skipped
//! 3. If rasterization is impossible, decode the bytes as a single still
//!    image and recognize it once
//!
//! The extractor never fails: empty text means nothing could be recognized.

use std::sync::Arc;

use image::DynamicImage;
use tracing::{info, warn};

use crate::document::{
    page_marker, DocumentError, DocumentResult, ExtractedText, ExtractionMethod,
};
use crate::mupdf::PdfDocument;

use super::normalize::normalize;
use super::provider::{TesseractProvider, TextRecognizer};
use super::types::{OcrError, OcrSettings};

/// Rendered pages of a document, produced lazily in page order
pub type PageImages = Box<dyn Iterator<Item = DocumentResult<DynamicImage>>>;

/// Turns a multi-page document into page rasters
pub trait PageRasterizer: Send + Sync {
    /// Err means the bytes are not a renderable multi-page document
    fn rasterize(&self, bytes: &[u8]) -> DocumentResult<PageImages>;
}

/// MuPDF-backed rasterizer for PDFs
pub struct MupdfRasterizer {
    dpi: u32,
}

impl MupdfRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

impl PageRasterizer for MupdfRasterizer {
    fn rasterize(&self, bytes: &[u8]) -> DocumentResult<PageImages> {
        let doc = PdfDocument::from_bytes(bytes)?;
        let page_count = doc.page_count();
        if page_count == 0 {
            return Err(DocumentError::ParseError("document has no pages".into()));
        }

        let dpi = self.dpi;
        Ok(Box::new(
            (0..page_count).map(move |index| doc.render_page(index, dpi)),
        ))
    }
}

/// OCR text extractor
pub struct OcrExtractor {
    rasterizer: Arc<dyn PageRasterizer>,
    recognizer: Arc<dyn TextRecognizer>,
}

impl OcrExtractor {
    pub fn new(rasterizer: Arc<dyn PageRasterizer>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            rasterizer,
            recognizer,
        }
    }

    /// MuPDF rasterization + Tesseract recognition
    pub fn with_tesseract(settings: &OcrSettings) -> Self {
        Self::new(
            Arc::new(MupdfRasterizer::new(settings.dpi)),
            Arc::new(TesseractProvider::new(settings)),
        )
    }

    /// Extract text from a document via OCR
    pub fn extract(&self, bytes: &[u8]) -> ExtractedText {
        info!("Starting OCR extraction");

        let text = match self.rasterizer.rasterize(bytes) {
            Ok(pages) => self.recognize_pages(pages),
            Err(e) => {
                info!("Not a multi-page document ({}), trying as single image", e);
                self.recognize_single_image(bytes)
            }
        };

        info!(chars = text.chars().count(), "OCR finished");
        ExtractedText::new(ExtractionMethod::Ocr, text)
    }

    fn recognize_pages(&self, pages: PageImages) -> String {
        let mut text = String::new();
        let mut rendered = 0usize;

        for (index, page) in pages.enumerate() {
            rendered += 1;
            let page_number = index + 1;

            let result = page
                .map_err(OcrError::from)
                .and_then(|image| self.recognize_image(&image));

            match result {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    text.push_str(&page_marker(ExtractionMethod::Ocr, page_number));
                }
                Err(e) => {
                    warn!(page = page_number, "OCR failed for page: {}", e);
                }
            }
        }

        info!(pages = rendered, "Document rasterized for OCR");
        text
    }

    fn recognize_single_image(&self, bytes: &[u8]) -> String {
        let result = image::load_from_memory(bytes)
            .map_err(|e| OcrError::from(DocumentError::from(e)))
            .map(|decoded| DynamicImage::ImageRgb8(decoded.to_rgb8()))
            .and_then(|rgb| self.recognize_image(&rgb));

        match result {
            Ok(text) => text,
            Err(e) => {
                warn!("OCR failed both as document and as image: {}", e);
                String::new()
            }
        }
    }

    fn recognize_image(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let cleaned = normalize(image);
        self.recognizer.recognize(&cleaned.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::provider::MockRecognizer;
    use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Rasterizer with canned pages; `None` means "not a multi-page document"
    struct FakeRasterizer {
        pages: Option<Vec<bool>>,
        calls: AtomicUsize,
    }

    impl FakeRasterizer {
        fn not_a_document() -> Self {
            Self {
                pages: None,
                calls: AtomicUsize::new(0),
            }
        }

        /// `true` renders fine, `false` fails to render
        fn with_pages(pages: &[bool]) -> Self {
            Self {
                pages: Some(pages.to_vec()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PageRasterizer for FakeRasterizer {
        fn rasterize(&self, _bytes: &[u8]) -> DocumentResult<PageImages> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.pages {
                None => Err(DocumentError::UnsupportedFormat("not a pdf".into())),
                Some(pages) => Ok(Box::new(pages.clone().into_iter().map(|ok| {
                    if ok {
                        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                            8,
                            8,
                            Rgb([250, 250, 250]),
                        )))
                    } else {
                        Err(DocumentError::RenderError("broken page".into()))
                    }
                }))),
            }
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_fn(12, 12, |x, _| {
            if x < 6 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_empty_bytes_yield_empty_text() {
        let recognizer = Arc::new(MockRecognizer::returning("never"));
        let extractor = OcrExtractor::new(
            Arc::new(MupdfRasterizer::new(300)),
            recognizer.clone(),
        );

        let result = extractor.extract(&[]);

        assert!(result.is_empty());
        assert_eq!(result.method, ExtractionMethod::Ocr);
        assert_eq!(recognizer.call_count(), 0);
    }

    #[test]
    fn test_png_goes_through_single_image_fallback() {
        let rasterizer = Arc::new(FakeRasterizer::not_a_document());
        let recognizer = Arc::new(MockRecognizer::returning("Hemoglobina 13,5 g/dL"));
        let extractor = OcrExtractor::new(rasterizer.clone(), recognizer.clone());

        let result = extractor.extract(&png_bytes());

        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(recognizer.call_count(), 1);
        assert_eq!(result.text, "Hemoglobina 13,5 g/dL");
    }

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &byte in bytes {
            crc ^= byte as u32;
            for _ in 0..8 {
                crc = if crc & 1 == 1 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            }
        }
        !crc
    }

    fn adler32(bytes: &[u8]) -> u32 {
        let (mut a, mut b) = (1u32, 0u32);
        for &byte in bytes {
            a = (a + byte as u32) % 65521;
            b = (b + a) % 65521;
        }
        (b << 16) | a
    }

    fn push_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
        png.extend_from_slice(&(data.len() as u32).to_be_bytes());
        let start = png.len();
        png.extend_from_slice(kind);
        png.extend_from_slice(data);
        let crc = crc32(&png[start..]);
        png.extend_from_slice(&crc.to_be_bytes());
    }

    /// 8-bit palette-indexed PNG, pixel data in a single stored deflate block
    fn indexed_png(width: u32, height: u32, palette: &[[u8; 3]]) -> Vec<u8> {
        let mut raw = Vec::new();
        for y in 0..height {
            raw.push(0); // filter: none
            for x in 0..width {
                raw.push(((x + y) as usize % palette.len()) as u8);
            }
        }
        assert!(raw.len() <= u16::MAX as usize);

        let mut zlib = vec![0x78, 0x01, 0x01];
        zlib.extend_from_slice(&(raw.len() as u16).to_le_bytes());
        zlib.extend_from_slice(&(!(raw.len() as u16)).to_le_bytes());
        zlib.extend_from_slice(&raw);
        zlib.extend_from_slice(&adler32(&raw).to_be_bytes());

        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&width.to_be_bytes());
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[8, 3, 0, 0, 0]);

        let plte: Vec<u8> = palette.iter().flatten().copied().collect();

        let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
        push_chunk(&mut png, b"IHDR", &ihdr);
        push_chunk(&mut png, b"PLTE", &plte);
        push_chunk(&mut png, b"IDAT", &zlib);
        push_chunk(&mut png, b"IEND", &[]);
        png
    }

    fn assert_single_image_recognized(bytes: &[u8], expected: (u32, u32)) {
        let recognizer = Arc::new(MockRecognizer::returning("Glicose 92 mg/dL"));
        let extractor = OcrExtractor::new(
            Arc::new(MupdfRasterizer::new(300)),
            recognizer.clone(),
        );

        let result = extractor.extract(bytes);

        assert_eq!(recognizer.call_count(), 1);
        assert_eq!(recognizer.seen_sizes(), vec![expected]);
        assert_eq!(result.text, "Glicose 92 mg/dL");
        assert!(!result.text.contains("--- OCR"));
    }

    #[test]
    fn test_rgba_png_is_recognized_once() {
        let rgba = RgbaImage::from_fn(15, 9, |x, _| Rgba([0, 0, 0, if x % 2 == 0 { 255 } else { 0 }]));
        assert_single_image_recognized(&encode_png(DynamicImage::ImageRgba8(rgba)), (15, 9));
    }

    #[test]
    fn test_grayscale_png_is_recognized_once() {
        let gray = GrayImage::from_fn(11, 17, |x, y| Luma([((x * 20 + y * 7) % 256) as u8]));
        assert_single_image_recognized(&encode_png(DynamicImage::ImageLuma8(gray)), (11, 17));
    }

    #[test]
    fn test_palette_png_is_recognized_once() {
        let png = indexed_png(13, 10, &[[255, 255, 255], [0, 0, 0], [200, 30, 30]]);

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (13, 10));

        assert_single_image_recognized(&png, (13, 10));
    }

    #[test]
    fn test_real_rasterizer_rejects_png() {
        let recognizer = Arc::new(MockRecognizer::returning("texto"));
        let extractor = OcrExtractor::new(
            Arc::new(MupdfRasterizer::new(300)),
            recognizer.clone(),
        );

        let result = extractor.extract(&png_bytes());

        assert_eq!(result.text, "texto");
        assert_eq!(recognizer.call_count(), 1);
    }

    #[test]
    fn test_pages_are_joined_with_markers() {
        let extractor = OcrExtractor::new(
            Arc::new(FakeRasterizer::with_pages(&[true, true])),
            Arc::new(MockRecognizer::returning("pagina")),
        );

        let result = extractor.extract(b"%PDF-fake");

        assert_eq!(
            result.text,
            "pagina\n--- OCR P1 ---\npagina\n--- OCR P2 ---\n"
        );
    }

    #[test]
    fn test_failing_page_is_skipped() {
        let recognizer = Arc::new(MockRecognizer::returning("ok"));
        let extractor = OcrExtractor::new(
            Arc::new(FakeRasterizer::with_pages(&[true, false, true])),
            recognizer.clone(),
        );

        let result = extractor.extract(b"%PDF-fake");

        assert_eq!(recognizer.call_count(), 2);
        assert_eq!(result.text, "ok\n--- OCR P1 ---\nok\n--- OCR P3 ---\n");
    }

    #[test]
    fn test_all_pages_failing_yields_empty_text() {
        let extractor = OcrExtractor::new(
            Arc::new(FakeRasterizer::with_pages(&[true, true])),
            Arc::new(MockRecognizer::failing("engine crashed")),
        );

        assert!(extractor.extract(b"%PDF-fake").is_empty());
    }

    #[test]
    fn test_undecodable_bytes_yield_empty_text() {
        let recognizer = Arc::new(MockRecognizer::returning("never"));
        let extractor = OcrExtractor::new(
            Arc::new(FakeRasterizer::not_a_document()),
            recognizer.clone(),
        );

        assert!(extractor.extract(b"not an image at all").is_empty());
        assert_eq!(recognizer.call_count(), 0);
    }
}
