//! Viewport transform engine.
//!
//! A [`Transform`] maps window coordinates to image coordinates: the window
//! point `(sx, sy)` shows the image point `(x + sx / scale, y + sy / scale)`.
//!
//! Every mutation goes through [`clamp_pan`], which enforces the coverage
//! invariant: the crop region, mapped into image space, must lie entirely
//! inside the source image. Proposals that cannot satisfy it (the image is
//! smaller than the region at the proposed scale) are rejected and the
//! previous transform is kept.
//!
//! # Coordinate System
//!
//! - Window coordinates are device pixels with the origin at the top-left
//!   of the interactive surface.
//! - `(x, y)` is the image-space point under the window origin, so it may be
//!   negative when the region does not start at the window edge.

use serde::{Deserialize, Serialize};

use crate::geometry::Region;

/// Zoom ratio for one mouse-wheel notch away from the user.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Relative tolerance for rounding noise in coverage bounds.
const COVERAGE_SLACK: f64 = 1e-12;

/// Translation and uniform scale of the image inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

/// Everything the engine needs to check the coverage invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageBounds {
    pub image_width: f64,
    pub image_height: f64,
    pub region: Region,
}

impl CoverageBounds {
    pub fn new(image_width: u32, image_height: u32, region: Region) -> Self {
        Self {
            image_width: image_width as f64,
            image_height: image_height as f64,
            region,
        }
    }
}

/// Clamp a proposed translation so the region stays covered at `scale`.
///
/// `x` is clamped into `[-left / scale, image_width - right / scale]` and
/// `y` likewise. Returns `None` when either interval is inverted or the
/// scale is not a finite positive number.
pub fn clamp_pan(x: f64, y: f64, scale: f64, bounds: &CoverageBounds) -> Option<(f64, f64)> {
    if !(scale.is_finite() && scale > 0.0 && x.is_finite() && y.is_finite()) {
        return None;
    }
    let region = &bounds.region;
    let left = region.left as f64 / scale;
    let top = region.top as f64 / scale;
    let right = region.right as f64 / scale;
    let bottom = region.bottom as f64 / scale;

    let (min_x, max_x) = settle_interval(-left, bounds.image_width - right, bounds.image_width)?;
    let (min_y, max_y) = settle_interval(-top, bounds.image_height - bottom, bounds.image_height)?;

    Some((x.clamp(min_x, max_x), y.clamp(min_y, max_y)))
}

/// Accept an interval, collapsing one inverted only by rounding noise.
///
/// At the exact cover scale `region / scale` can land an ulp past the
/// image edge, which would otherwise freeze the axis.
#[inline]
fn settle_interval(min: f64, max: f64, extent: f64) -> Option<(f64, f64)> {
    if min <= max {
        Some((min, max))
    } else if min - max <= COVERAGE_SLACK * (1.0 + extent) {
        Some((min, min))
    } else {
        None
    }
}

impl Transform {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Fit an `image_width x image_height` image so it covers the whole
    /// `window_width x window_height` window, centered on the longer axis.
    ///
    /// The cover scale is `max(window_w / image_w, window_h / image_h)`.
    /// When width drives the scale the excess height is split evenly (and
    /// truncated), and vice versa. Zero extents yield the identity.
    pub fn reset(image_width: u32, image_height: u32, window_width: u32, window_height: u32) -> Self {
        if image_width == 0 || image_height == 0 || window_width == 0 || window_height == 0 {
            return Self::default();
        }
        let (iw, ih) = (image_width as f64, image_height as f64);
        let (ww, wh) = (window_width as f64, window_height as f64);
        let sw = ww / iw;
        let sh = wh / ih;

        if sw > sh {
            let scale = sw;
            Self::new(0.0, ((ih - wh / scale) / 2.0).trunc(), scale)
        } else {
            let scale = sh;
            Self::new(((iw - ww / scale) / 2.0).trunc(), 0.0, scale)
        }
    }

    /// Reset and then settle the result against `bounds`.
    ///
    /// The cover scale already satisfies the invariant analytically; the
    /// clamp absorbs floating error at the far edge.
    pub fn reset_covering(
        bounds: &CoverageBounds,
        image_width: u32,
        image_height: u32,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        let mut t = Self::reset(image_width, image_height, window_width, window_height);
        if let Some((x, y)) = clamp_pan(t.x, t.y, t.scale, bounds) {
            t.x = x;
            t.y = y;
        }
        t
    }

    /// Apply a proposed transform if it can be made to cover the region.
    ///
    /// Returns `false` and leaves `self` untouched on rejection.
    pub fn try_apply(&mut self, x: f64, y: f64, scale: f64, bounds: &CoverageBounds) -> bool {
        match clamp_pan(x, y, scale, bounds) {
            Some((x, y)) => {
                *self = Self::new(x, y, scale);
                true
            }
            None => false,
        }
    }

    /// Pan by a window-space delta. Dragging right moves the image right,
    /// so the image-space origin moves left.
    pub fn pan(&mut self, dx: f64, dy: f64, bounds: &CoverageBounds) -> bool {
        let x = self.x - dx / self.scale;
        let y = self.y - dy / self.scale;
        self.try_apply(x, y, self.scale, bounds)
    }

    /// Zoom by `ratio` about the window point `(fx, fy)`.
    pub fn pinch(&mut self, fx: f64, fy: f64, ratio: f64, bounds: &CoverageBounds) -> bool {
        let target = self.pinch_target(fx, fy, ratio);
        self.try_apply(target.x, target.y, target.scale, bounds)
    }

    /// Mouse-wheel zoom at `(fx, fy)`: positive `delta_y` zooms out.
    pub fn zoom_wheel(&mut self, fx: f64, fy: f64, delta_y: f64, bounds: &CoverageBounds) -> bool {
        let ratio = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            1.0 / WHEEL_ZOOM_OUT
        };
        self.pinch(fx, fy, ratio, bounds)
    }

    /// Unclamped focal-point zoom.
    ///
    /// With `scale' = scale * ratio` and `x' = x + fx * (ratio - 1) / scale'`
    /// the image point under `(fx, fy)` is the same before and after.
    pub fn pinch_target(&self, fx: f64, fy: f64, ratio: f64) -> Self {
        let scale = self.scale * ratio;
        let ds = (ratio - 1.0) / scale;
        Self::new(self.x + fx * ds, self.y + fy * ds, scale)
    }

    /// Image-space point shown at window point `(sx, sy)`.
    #[inline]
    pub fn image_point(&self, sx: f64, sy: f64) -> (f64, f64) {
        (self.x + sx / self.scale, self.y + sy / self.scale)
    }

    /// Whether the region maps inside the image, allowing `epsilon` slack.
    pub fn covers(&self, bounds: &CoverageBounds, epsilon: f64) -> bool {
        let r = &bounds.region;
        let (l, t) = self.image_point(r.left as f64, r.top as f64);
        let (rt, b) = self.image_point(r.right as f64, r.bottom as f64);
        l >= -epsilon
            && t >= -epsilon
            && rt <= bounds.image_width + epsilon
            && b <= bounds.image_height + epsilon
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
