//! Image encoding for crop export.
//!
//! This module provides functionality for:
//! - Encoding RGBA rasters to PNG (alpha preserved)
//! - Encoding rasters to JPEG with a `[0, 1]` quality knob, flattened over
//!   a matte color
//!
//! All operations are synchronous and single-threaded.

mod jpeg;
mod png;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;

pub use jpeg::{encode_jpeg, flatten, jpeg_quality, DEFAULT_JPEG_QUALITY};
pub use png::encode_png;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encoded output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[default]
    #[serde(rename = "image/png")]
    Png,
}

impl OutputType {
    /// MIME type string.
    pub fn mime(self) -> &'static str {
        match self {
            OutputType::Jpeg => "image/jpeg",
            OutputType::Png => "image/png",
        }
    }

    /// Whether the quality setting affects this format.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputType::Jpeg)
    }

    /// Parse a MIME type; `image/jpg` is accepted as an alias.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(OutputType::Jpeg),
            "image/png" => Some(OutputType::Png),
            _ => None,
        }
    }
}

/// Encode a raster in the requested format.
///
/// `quality` only applies to JPEG. `matte` is the color transparent
/// pixels are flattened onto for formats without alpha.
pub fn encode_raster(
    image: &RgbaImage,
    output_type: OutputType,
    quality: Option<f64>,
    matte: Color,
) -> Result<Vec<u8>, EncodeError> {
    match output_type {
        OutputType::Png => encode_png(image),
        OutputType::Jpeg => {
            let rgb = flatten(image, matte);
            encode_jpeg(&rgb, image.width(), image.height(), jpeg_quality(quality))
        }
    }
}
