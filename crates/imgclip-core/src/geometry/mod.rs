//! Crop window geometry.
//!
//! Pure functions for placing the crop region inside the viewport window,
//! building the clip path for each shape, and rendering the dimmed overlay.
//!
//! # Numeric policy
//!
//! All pixel bounds truncate toward zero rather than round, and negative
//! sizes clamp to zero, so the same inputs always produce the same pixels.

mod clip_path;
mod overlay;
mod region;

pub use clip_path::ClipPath;
pub use overlay::{render_overlay, OVERLAY_BORDER, OVERLAY_DIM};
pub use region::{compute_region, Region};

pub(crate) use region::trunc_px;
