//! Export pipeline: reproduce what the viewport shows as an encoded raster.
//!
//! The pipeline is deterministic and runs to completion synchronously:
//!
//! 1. Map the crop region through the transform to a source rectangle.
//! 2. Allocate the output raster and fill the background, if any.
//! 3. For circles, build a clip path against the output raster itself.
//! 4. Copy source pixels 1:1 inside the clip (source-over).
//! 5. Resample to the target size when one is requested.
//! 6. Encode.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::color::Color;
use crate::decode::{resize, target_dimensions, DecodeError, SourceImage};
use crate::encode::{encode_raster, EncodeError, OutputType};
use crate::geometry::{compute_region, trunc_px, ClipPath, Region};
use crate::options::{Options, Shape};
use crate::viewport::Transform;

/// Largest raster the crate allocates for an export or overlay, in pixels
/// (8192 x 8192, 256 MiB of RGBA).
pub const MAX_RASTER_PIXELS: u64 = 8192 * 8192;

/// Whether a `width x height` RGBA raster stays under [`MAX_RASTER_PIXELS`].
pub(crate) fn raster_fits(width: u32, height: u32) -> bool {
    (width as u64)
        .checked_mul(height as u64)
        .is_some_and(|pixels| pixels <= MAX_RASTER_PIXELS)
}

/// Errors that abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No image loaded")]
    NoImage,

    /// The region maps to less than one source pixel on an axis.
    #[error("Empty crop: {width}x{height}")]
    EmptyCrop { width: u32, height: u32 },

    /// The requested output size degenerates to zero on an axis or exceeds
    /// [`MAX_RASTER_PIXELS`].
    #[error("Invalid target size: {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },

    #[error("Resize failed: {0}")]
    Resize(#[from] DecodeError),

    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Source-image rectangle visible through the crop region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// An encoded export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropResult {
    #[serde(rename = "type")]
    pub output_type: OutputType,
    /// Quality the caller asked for; `None` when unset or not applicable.
    pub quality: Option<f64>,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Map `region` through `transform` into source pixels, truncating.
pub fn source_rect(transform: &Transform, region: &Region) -> Result<SourceRect, ExportError> {
    let scale = transform.scale;
    let width = trunc_px(region.width() as f64 / scale);
    let height = trunc_px(region.height() as f64 / scale);
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCrop { width, height });
    }
    let (x, y) = transform.image_point(region.left as f64, region.top as f64);
    Ok(SourceRect {
        x: trunc_px(x),
        y: trunc_px(y),
        width,
        height,
    })
}

/// Copy `rect` out of `image` at 1:1 onto a fresh raster, masked to `shape`.
///
/// Pixels outside the clip keep the background (transparent when none is
/// set). Source pixels past the image edge are skipped.
pub fn render_crop(
    image: &SourceImage,
    rect: SourceRect,
    shape: Shape,
    background: Option<Color>,
) -> RgbaImage {
    let fill = background.unwrap_or(Color::TRANSPARENT).to_array();
    let mut out = RgbaImage::from_pixel(rect.width, rect.height, Rgba(fill));

    // The circle is derived from the output raster's own extent.
    let clip = match shape {
        Shape::Circle => {
            let region = compute_region(rect.width, rect.height, Shape::Circle, 1.0);
            Some(ClipPath::build(rect.width, rect.height, &region, Shape::Circle))
        }
        Shape::Square | Shape::Rect => None,
    };

    for (dx, dy, dst) in out.enumerate_pixels_mut() {
        if clip.is_some_and(|c| !c.contains(dx, dy)) {
            continue;
        }
        let (Some(sx), Some(sy)) = (rect.x.checked_add(dx), rect.y.checked_add(dy)) else {
            continue;
        };
        if let Some(src) = image.pixel(sx, sy) {
            dst.0 = blend_over(dst.0, src);
        }
    }
    out
}

/// Straight-alpha source-over composite.
#[inline]
fn blend_over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    match src[3] {
        255 => return src,
        0 => return dst,
        _ => {}
    }
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let channel = |s: u8, d: u8| {
        let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ]
}

/// Run the full pipeline for the current view.
///
/// `output_type` and `quality` override the session options for this call
/// only; everything else (shape, background, target size, filter) comes
/// from `options`.
pub fn export(
    image: &SourceImage,
    transform: &Transform,
    region: &Region,
    options: &Options,
    output_type: OutputType,
    quality: Option<f64>,
) -> Result<CropResult, ExportError> {
    if image.is_empty() {
        return Err(ExportError::NoImage);
    }

    let rect = source_rect(transform, region)?;
    let mut raster = render_crop(image, rect, options.shape, options.background);

    if let Some((width, height)) =
        target_dimensions(rect.width, rect.height, options.width, options.height)
    {
        if width == 0 || height == 0 || !raster_fits(width, height) {
            return Err(ExportError::InvalidTarget { width, height });
        }
        raster = resize(&raster, width, height, options.filter)?;
    }

    let data = encode_raster(&raster, output_type, quality, options.matte())?;
    debug!(
        src_x = rect.x,
        src_y = rect.y,
        src_width = rect.width,
        src_height = rect.height,
        width = raster.width(),
        height = raster.height(),
        mime = output_type.mime(),
        bytes = data.len(),
        "exported crop"
    );

    Ok(CropResult {
        output_type,
        quality: quality.filter(|_| output_type.is_lossy()),
        data,
        width: raster.width(),
        height: raster.height(),
    })
}
