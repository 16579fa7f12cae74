//! Raster resampling for export sizing.
//!
//! Wraps the `image` crate's resize with the target-size rules of the
//! export pipeline: a single requested edge derives the other from the
//! source aspect ratio.

use image::RgbaImage;

use super::{DecodeError, FilterType};
use crate::geometry::trunc_px;

/// Resize a raster to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::EmptyImage` if either target dimension is zero.
pub fn resize(
    image: &RgbaImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RgbaImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    Ok(image::imageops::resize(
        image,
        width,
        height,
        filter.to_image_filter(),
    ))
}

/// Compute the output size for a `src_width x src_height` raster given an
/// optional target width and height.
///
/// A zero edge counts as unset.
///
/// - Neither set: `None` (no resampling).
/// - Both set: used as-is, aspect ratio is not enforced.
/// - One set: the other is `w = h * src_w / src_h` (or the converse),
///   truncated toward zero.
pub fn target_dimensions(
    src_width: u32,
    src_height: u32,
    target_width: Option<u32>,
    target_height: Option<u32>,
) -> Option<(u32, u32)> {
    let sw = src_width as f64;
    let sh = src_height as f64;
    match (
        target_width.filter(|w| *w > 0),
        target_height.filter(|h| *h > 0),
    ) {
        (None, None) => None,
        (Some(w), Some(h)) => Some((w, h)),
        (Some(w), None) => Some((w, trunc_px(w as f64 * sh / sw))),
        (None, Some(h)) => Some((trunc_px(h as f64 * sw / sh), h)),
    }
}
