//! Page-level helpers: plain text and rasterization

use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Matrix, Page, TextPageOptions};

use crate::document::{DocumentError, Result};

/// PDF user space unit: 72 points per inch
const POINTS_PER_INCH: f32 = 72.0;

/// Scale factor that renders a page at `dpi`
pub fn points_to_scale(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}

/// Get plain text from a page (without positions)
pub fn extract_plain_text(page: &Page) -> Result<String> {
    let text_page = page
        .to_text_page(TextPageOptions::empty())
        .map_err(|e| DocumentError::TextExtractionError(e.to_string()))?;
    let text = text_page
        .to_text()
        .map_err(|e| DocumentError::TextExtractionError(e.to_string()))?;
    Ok(text)
}

/// Render a page to an RGB raster at `dpi`
pub fn render_page_rgb(page: &Page, dpi: u32) -> Result<DynamicImage> {
    let scale = points_to_scale(dpi);
    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();
    let pixmap = page
        .to_pixmap(&matrix, &colorspace, false, true)
        .map_err(|e| DocumentError::RenderError(e.to_string()))?;

    pixmap_to_rgb(&pixmap)
}

fn pixmap_to_rgb(pixmap: &mupdf::Pixmap) -> Result<DynamicImage> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    if n < 3 {
        return Err(DocumentError::RenderError(format!(
            "unexpected pixmap component count {}",
            n
        )));
    }

    let mut rgb_buffer = Vec::with_capacity((width * height * 3) as usize);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(255);
            let g = samples.get(offset + 1).copied().unwrap_or(255);
            let b = samples.get(offset + 2).copied().unwrap_or(255);
            rgb_buffer.extend_from_slice(&[r, g, b]);
        }
    }

    let img = RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| DocumentError::ImageError("Failed to create image buffer".to_string()))?;

    Ok(DynamicImage::ImageRgb8(img))
}
