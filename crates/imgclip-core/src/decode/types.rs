//! Source raster and the decode-side error, filter and orientation types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure turning bytes or a pixel buffer into a [`SourceImage`].
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Bytes are neither JPEG nor PNG.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The codec rejected the stream.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The decoded raster has a zero dimension.
    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// Pixel buffer length does not match the declared dimensions.
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// Resampling filter used when an export is scaled to its target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Nearest,
    #[default]
    Bilinear,
    /// Sharpest, and the slowest.
    Lanczos3,
}

impl FilterType {
    /// Matching `image` filter. `Bilinear` is `Triangle` there.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// EXIF `Orientation` tag. Unknown values read as `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Flip horizontal + rotate 270 CW.
    Transpose = 5,
    Rotate90CW = 6,
    /// Flip horizontal + rotate 90 CW.
    Transverse = 7,
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// A decoded source raster with RGBA pixel data.
///
/// The crop session owns exactly one of these at a time and replaces it
/// wholesale on every successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl SourceImage {
    /// Create a SourceImage, validating the buffer length.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(DecodeError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a SourceImage from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// RGBA value at `(x, y)`, or `None` outside the raster.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// True when the raster has nothing to crop.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
