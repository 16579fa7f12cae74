//! WASM-compatible wrapper types for rasters and crop results.
//!
//! These wrap the core imgclip types and handle the conversion between Rust
//! and JavaScript data representations.

use imgclip_core::{CropResult, LoadTicket, SourceImage};
use wasm_bindgen::prelude::*;

/// A decoded RGBA raster for JavaScript, e.g. from `ImageData`.
///
/// # Memory Management
///
/// The pixel data lives in WASM memory. `pixels()` copies it out to a
/// `Uint8Array`.
#[wasm_bindgen]
pub struct JsSourceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsSourceImage {
    /// Create an image from RGBA pixel data (4 bytes per pixel, row-major).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsSourceImage {
        JsSourceImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Copy of the RGBA pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsSourceImage {
    /// Validate and convert to a core raster. Clones the pixel data.
    pub(crate) fn to_source(&self) -> Result<SourceImage, imgclip_core::DecodeError> {
        SourceImage::new(self.width, self.height, self.pixels.clone())
    }
}

/// An encoded crop for JavaScript.
#[wasm_bindgen]
pub struct JsCropResult {
    inner: CropResult,
}

#[wasm_bindgen]
impl JsCropResult {
    /// MIME type of `data`.
    #[wasm_bindgen(getter, js_name = "type")]
    pub fn mime(&self) -> String {
        self.inner.output_type.mime().to_string()
    }

    /// Requested JPEG quality, if any.
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> Option<f64> {
        self.inner.quality
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.data.len()
    }

    /// Encoded bytes as a `Uint8Array` copy.
    pub fn data(&self) -> Vec<u8> {
        self.inner.data.clone()
    }
}

impl From<CropResult> for JsCropResult {
    fn from(inner: CropResult) -> Self {
        Self { inner }
    }
}

/// Handle for a URL load started with `JsCropSession.loadUrl`.
#[wasm_bindgen]
pub struct JsLoadTicket {
    inner: LoadTicket,
}

#[wasm_bindgen]
impl JsLoadTicket {
    /// Cache-busted URL the host should fetch.
    #[wasm_bindgen(getter)]
    pub fn url(&self) -> Option<String> {
        self.inner.url().map(str::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> f64 {
        self.inner.generation() as f64
    }
}

impl JsLoadTicket {
    pub(crate) fn new(inner: LoadTicket) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &LoadTicket {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgclip_core::OutputType;

    #[test]
    fn test_source_image_accessors() {
        let img = JsSourceImage::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(img.width(), 2);
        assert_eq!(img.height(), 1);
        assert_eq!(img.byte_length(), 8);
        assert_eq!(img.pixels(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_source_image_validates_length() {
        assert!(JsSourceImage::new(2, 2, vec![0; 16]).to_source().is_ok());
        assert!(JsSourceImage::new(2, 2, vec![0; 12]).to_source().is_err());
    }

    #[test]
    fn test_crop_result_accessors() {
        let result = JsCropResult::from(CropResult {
            output_type: OutputType::Jpeg,
            quality: Some(0.8),
            data: vec![0xFF, 0xD8],
            width: 10,
            height: 20,
        });
        assert_eq!(result.mime(), "image/jpeg");
        assert_eq!(result.quality(), Some(0.8));
        assert_eq!((result.width(), result.height()), (10, 20));
        assert_eq!(result.byte_length(), 2);
        assert_eq!(result.data(), vec![0xFF, 0xD8]);
    }
}
