//! Clip paths for the crop shapes.

use serde::{Deserialize, Serialize};

use super::region::Region;
use crate::options::Shape;

/// Outline that masks a raster to the crop shape.
///
/// Coordinates are integer pixels; membership is decided at pixel centers
/// so rasterization is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClipPath {
    Circle { cx: u32, cy: u32, radius: u32 },
    Rect {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },
}

impl ClipPath {
    /// Build the path for `region` on a `width x height` surface.
    ///
    /// The circle is centered on the surface itself with radius `size / 2`;
    /// every other shape uses the region rectangle.
    pub fn build(width: u32, height: u32, region: &Region, shape: Shape) -> Self {
        match shape {
            Shape::Circle => ClipPath::Circle {
                cx: width / 2,
                cy: height / 2,
                radius: region.size / 2,
            },
            Shape::Square | Shape::Rect => ClipPath::Rect {
                left: region.left,
                top: region.top,
                right: region.right,
                bottom: region.bottom,
            },
        }
    }

    /// Whether the pixel at `(px, py)` lies inside the path.
    #[inline]
    pub fn contains(&self, px: u32, py: u32) -> bool {
        match *self {
            ClipPath::Circle { cx, cy, radius } => {
                let r = radius as f64;
                distance_from_center(px, py, cx, cy) <= r * r
            }
            ClipPath::Rect {
                left,
                top,
                right,
                bottom,
            } => px >= left && px < right && py >= top && py < bottom,
        }
    }

    /// Whether the pixel is on the one-pixel border just inside the path.
    pub fn on_border(&self, px: u32, py: u32) -> bool {
        if !self.contains(px, py) {
            return false;
        }
        match *self {
            ClipPath::Circle { cx, cy, radius } => {
                let inner = (radius as f64 - 1.0).max(0.0);
                distance_from_center(px, py, cx, cy) > inner * inner
            }
            ClipPath::Rect {
                left,
                top,
                right,
                bottom,
            } => px == left || py == top || px + 1 == right || py + 1 == bottom,
        }
    }
}

/// Squared distance from the pixel center to `(cx, cy)`.
#[inline]
fn distance_from_center(px: u32, py: u32, cx: u32, cy: u32) -> f64 {
    let dx = px as f64 + 0.5 - cx as f64;
    let dy = py as f64 + 0.5 - cy as f64;
    dx * dx + dy * dy
}
