//! imgclip Core - interactive image cropping
//!
//! This crate holds everything behind an image-crop surface: where the crop
//! window sits, how pointer gestures pan and zoom the image under it while
//! keeping the window covered, and how the visible region is exported as an
//! encoded raster.
//!
//! # Module Structure
//!
//! - `geometry` - Crop region, clip paths and the dimmed overlay
//! - `viewport` - The `(x, y, scale)` transform and its coverage clamp
//! - `gesture` - Pointer frames to pan/pinch/tap actions
//! - `export` - Visible region to encoded bytes
//! - `session` - Load lifecycle, events and input routing
//! - `decode` / `encode` - Image codecs and resampling
//!
//! Logging goes through `tracing`; install a subscriber to see it.

pub mod color;
pub mod decode;
pub mod encode;
pub mod error;
pub mod export;
pub mod geometry;
pub mod gesture;
pub mod options;
pub mod session;
pub mod viewport;

pub use color::{Color, ParseColorError};
pub use decode::{decode_image, DecodeError, FilterType, SourceImage};
pub use encode::{EncodeError, OutputType};
pub use error::{ClipError, ErrorKind};
pub use export::{export, CropResult, ExportError, SourceRect, MAX_RASTER_PIXELS};
pub use geometry::{compute_region, render_overlay, ClipPath, Region};
pub use gesture::{GestureAction, GestureMachine, GestureState, PointerPhase, PointerSample};
pub use options::{target_extent, Options, Shape};
pub use session::{
    Affordance, CropSession, HideReason, ImageSource, LoadState, LoadTicket, SaveRequest,
    SessionEvent,
};
pub use viewport::{clamp_pan, CoverageBounds, Transform};
