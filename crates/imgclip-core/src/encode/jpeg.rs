//! JPEG encoding for export.
//!
//! JPEG carries no alpha channel, so RGBA rasters are flattened over a
//! matte color before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::io::Cursor;

use super::EncodeError;
use crate::color::Color;

/// Quality used when the caller leaves it unset (matches browser canvases).
pub const DEFAULT_JPEG_QUALITY: f64 = 0.92;

/// Map a `[0, 1]` quality to the encoder's `1..=100` scale.
///
/// `None` and non-finite values fall back to [`DEFAULT_JPEG_QUALITY`].
pub fn jpeg_quality(quality: Option<f64>) -> u8 {
    let q = quality
        .filter(|q| q.is_finite())
        .unwrap_or(DEFAULT_JPEG_QUALITY)
        .clamp(0.0, 1.0);
    ((q * 100.0).round() as u8).clamp(1, 100)
}

/// Encode packed RGB (3 bytes per pixel) at an encoder quality of `1..=100`.
///
/// Out-of-range qualities are clamped rather than rejected.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Flatten an RGBA raster over an opaque matte, producing packed RGB.
pub fn flatten(image: &RgbaImage, matte: Color) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        let a = a as u32;
        let blend = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
        rgb.push(blend(r, matte.r));
        rgb.push(blend(g, matte.g));
        rgb.push(blend(b, matte.b));
    }
    rgb
}
