//! OCR Providers
//!
//! Defines the recognizer trait and the Tesseract implementation.

use std::io::{Cursor, Write};
use std::process::{Command, Stdio};

use image::GrayImage;

use super::types::{OcrError, OcrSettings};

/// OCR engine trait
///
/// Recognition is blocking; callers run it on a blocking worker thread.
pub trait TextRecognizer: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Check if the engine can be invoked
    fn is_available(&self) -> bool;

    /// Recognize the text of a normalized page
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError>;
}

/// Tesseract OCR provider (CLI)
///
/// The page is piped as PNG through `stdin` and the text read from `stdout`,
/// so no temporary files are involved.
pub struct TesseractProvider {
    command: String,
    language: String,
    page_seg_mode: u8,
}

impl TesseractProvider {
    pub fn new(settings: &OcrSettings) -> Self {
        Self {
            command: settings.tesseract_cmd.clone(),
            language: settings.language.clone(),
            page_seg_mode: settings.page_seg_mode,
        }
    }

    fn encode_png(image: &GrayImage) -> Result<Vec<u8>, OcrError> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .map_err(|e| OcrError::ImageEncodingError(e.to_string()))?;
        Ok(buffer)
    }
}

impl TextRecognizer for TesseractProvider {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        let png = Self::encode_png(image)?;

        let mut child = Command::new(&self.command)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_seg_mode.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                OcrError::ProviderNotAvailable(format!("Failed to run {}: {}", self.command, e))
            })?;

        // Tesseract may exit before reading stdin (e.g. missing traineddata),
        // so a failed write still reaps the child and reports its stderr.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to read output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        write_result
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write image: {}", e)))?;

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Mock recognizer for testing
#[cfg(test)]
pub struct MockRecognizer {
    pub response: Result<String, String>,
    pub calls: std::sync::atomic::AtomicUsize,
    /// Dimensions of every image handed to `recognize`
    pub sizes: std::sync::Mutex<Vec<(u32, u32)>>,
}

#[cfg(test)]
impl MockRecognizer {
    pub fn returning(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            calls: std::sync::atomic::AtomicUsize::new(0),
            sizes: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: std::sync::atomic::AtomicUsize::new(0),
            sizes: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn seen_sizes(&self) -> Vec<(u32, u32)> {
        self.sizes.lock().map(|sizes| sizes.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl TextRecognizer for MockRecognizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Ok(mut sizes) = self.sizes.lock() {
            sizes.push(image.dimensions());
        }
        self.response
            .clone()
            .map_err(OcrError::ProcessingError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let provider = TesseractProvider::new(&OcrSettings {
            tesseract_cmd: "definitely-not-a-tesseract-binary".to_string(),
            ..Default::default()
        });

        assert!(!provider.is_available());
        let result = provider.recognize(&GrayImage::new(4, 4));
        assert!(matches!(result, Err(OcrError::ProviderNotAvailable(_))));
    }

    /// Shell script standing in for a Tesseract that exits without reading stdin
    #[cfg(unix)]
    fn early_exit_command(name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = std::env::temp_dir().join(format!(
            "labflow-{}-{}.sh",
            name,
            std::process::id()
        ));
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// Incompressible page, large enough to overflow a pipe buffer as PNG
    fn noise_page() -> GrayImage {
        let mut state: u32 = 0x9E37_79B9;
        GrayImage::from_fn(1200, 1200, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            image::Luma([(state & 0xFF) as u8])
        })
    }

    #[cfg(unix)]
    #[test]
    fn test_early_exit_reports_stderr() {
        let provider = TesseractProvider::new(&OcrSettings {
            tesseract_cmd: early_exit_command(
                "missing-lang",
                "echo \"Failed loading language 'por'\" >&2; exit 1",
            ),
            ..Default::default()
        });
        let page = noise_page();

        for _ in 0..3 {
            match provider.recognize(&page) {
                Err(OcrError::ProcessingError(message)) => {
                    assert!(message.contains("Failed loading language 'por'"), "{}", message)
                }
                other => panic!("expected ProcessingError, got {:?}", other),
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_early_exit_with_success_reports_write_error() {
        let provider = TesseractProvider::new(&OcrSettings {
            tesseract_cmd: early_exit_command("silent-exit", "exit 0"),
            ..Default::default()
        });

        match provider.recognize(&noise_page()) {
            Err(OcrError::ProcessingError(message)) => {
                assert!(message.starts_with("Failed to write image"), "{}", message)
            }
            other => panic!("expected ProcessingError, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_png_roundtrips_dimensions() {
        let png = TesseractProvider::encode_png(&GrayImage::new(7, 3)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 3));
    }
}
