//! Page image normalization for OCR
//!
//! Luminance conversion, Otsu binarization and a 3x3 median filter. The
//! transform is best-effort: whenever a step cannot run, the grayscale
//! version of the input is returned instead.

use std::panic::{catch_unwind, AssertUnwindSafe};

use image::{imageops, DynamicImage, GrayImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::median_filter;
use tracing::warn;

/// Median filter radius; 1 gives a 3x3 kernel
const MEDIAN_RADIUS: u32 = 1;

/// A single-channel page ready for recognition
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub image: GrayImage,
    /// `false` when binarization was skipped and `image` is plain grayscale
    pub binarized: bool,
}

#[derive(Debug, thiserror::Error)]
enum NormalizeError {
    #[error("unsupported channel layout ({0} channels)")]
    UnsupportedLayout(u8),

    #[error("image has no pixels ({0}x{1})")]
    Empty(u32, u32),
}

/// Normalize a page image for OCR. Never fails.
pub fn normalize(image: &DynamicImage) -> NormalizedImage {
    match catch_unwind(AssertUnwindSafe(|| binarize(image))) {
        Ok(Ok(binary)) => NormalizedImage {
            image: binary,
            binarized: true,
        },
        Ok(Err(e)) => {
            warn!("Image preprocessing failed: {}. Using grayscale input", e);
            grayscale_fallback(image)
        }
        Err(_) => {
            warn!("Image preprocessing panicked. Using grayscale input");
            grayscale_fallback(image)
        }
    }
}

fn binarize(image: &DynamicImage) -> Result<GrayImage, NormalizeError> {
    let gray = luminance(image)?;
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(NormalizeError::Empty(width, height));
    }

    let level = otsu_level(&gray);
    let binary = threshold(&gray, level, ThresholdType::Binary);
    Ok(median_filter(&binary, MEDIAN_RADIUS, MEDIAN_RADIUS))
}

/// Single-channel luminance; 4-channel input loses its alpha first
fn luminance(image: &DynamicImage) -> Result<GrayImage, NormalizeError> {
    match image.color().channel_count() {
        1 => Ok(image.to_luma8()),
        3 | 4 => Ok(imageops::grayscale(&image.to_rgb8())),
        n => Err(NormalizeError::UnsupportedLayout(n)),
    }
}

fn grayscale_fallback(image: &DynamicImage) -> NormalizedImage {
    let image = catch_unwind(AssertUnwindSafe(|| image.to_luma8()))
        .unwrap_or_else(|_| GrayImage::new(0, 0));
    NormalizedImage {
        image,
        binarized: false,
    }
}
