//! Image decoding and resampling for imgclip.
//!
//! This module provides functionality for:
//! - Decoding JPEG and PNG bytes into an RGBA source raster
//! - Correcting EXIF orientation at decode time
//! - Resampling rasters to a target export size
//!
//! All operations are synchronous. Hosts that need a non-blocking load
//! run [`decode_image`] elsewhere and hand the result to the crop session.

mod raster;
mod resize;
mod types;

pub use raster::decode_image;
pub use resize::{resize, target_dimensions};
pub use types::{DecodeError, FilterType, Orientation, SourceImage};
