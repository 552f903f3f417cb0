//! Core document types

use std::fmt;

use serde::Serialize;

/// Raster formats accepted for OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Bmp,
    Tiff,
}

impl ImageKind {
    /// Detect image kind from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Detect image kind from MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            "image/tiff" => Some(Self::Tiff),
            _ => None,
        }
    }
}

/// Declared kind of an uploaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image(ImageKind),
    /// Anything else; carries the extension or content type that was seen
    Unknown(String),
}

impl DocumentKind {
    /// Detect kind from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("pdf") {
            return Some(Self::Pdf);
        }
        ImageKind::from_extension(ext).map(Self::Image)
    }

    /// Detect kind from MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        if essence == "application/pdf" || essence == "application/x-pdf" {
            return Some(Self::Pdf);
        }
        ImageKind::from_mime(&essence).map(Self::Image)
    }

    /// Resolve the declared kind of an upload.
    ///
    /// The filename extension wins; the declared content type is consulted
    /// only when the extension is missing or unknown, then `mime_guess`.
    pub fn from_upload(filename: &str, content_type: Option<&str>) -> Self {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if let Some(kind) = Self::from_extension(&extension) {
            return kind;
        }
        if let Some(kind) = content_type.and_then(Self::from_mime) {
            return kind;
        }
        if let Some(kind) = mime_guess::from_path(filename)
            .first()
            .and_then(|mime| Self::from_mime(mime.essence_str()))
        {
            return kind;
        }

        let label = if extension.is_empty() {
            content_type.unwrap_or_default().to_string()
        } else {
            extension
        };
        Self::Unknown(label)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Image(ImageKind::Jpeg) => write!(f, "image/jpeg"),
            Self::Image(ImageKind::Png) => write!(f, "image/png"),
            Self::Image(ImageKind::Bmp) => write!(f, "image/bmp"),
            Self::Image(ImageKind::Tiff) => write!(f, "image/tiff"),
            Self::Unknown(label) if label.is_empty() => write!(f, "unknown"),
            Self::Unknown(label) => write!(f, "unknown ({})", label),
        }
    }
}

/// An uploaded file, never mutated after receipt
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let kind = DocumentKind::from_upload(&filename, content_type);
        Self {
            filename,
            kind,
            bytes,
        }
    }
}

/// How the text of a document was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// Embedded text layer
    Direct,
    /// Optical character recognition of rendered pixels
    Ocr,
}

impl ExtractionMethod {
    fn marker_tag(&self) -> &'static str {
        match self {
            Self::Direct => "Txt",
            Self::Ocr => "OCR",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Ocr => write!(f, "ocr"),
        }
    }
}

/// Page-boundary marker appended after each page fragment (1-indexed page)
pub fn page_marker(method: ExtractionMethod, page_number: usize) -> String {
    format!("\n--- {} P{} ---\n", method.marker_tag(), page_number)
}

/// Text of a whole document, tagged with the method that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub method: ExtractionMethod,
    pub text: String,
}

impl ExtractedText {
    pub fn new(method: ExtractionMethod, text: String) -> Self {
        Self { method, text }
    }

    pub fn empty(method: ExtractionMethod) -> Self {
        Self::new(method, String::new())
    }

    /// Empty text is a document-level extraction failure
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Character count ignoring surrounding whitespace
    pub fn trimmed_len(&self) -> usize {
        self.text.trim().chars().count()
    }
}
