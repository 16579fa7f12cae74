//! Crop region placement inside the viewport window.

use serde::{Deserialize, Serialize};

use crate::options::Shape;

/// Integer bounds of the crop region in window pixels.
///
/// `size` is the side of the base square (the shorter window edge); for
/// ratio-locked rectangles one axis is shrunk below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub size: u32,
}

impl Region {
    #[inline]
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Truncate toward zero, clamping negatives and non-finite values to 0.
#[inline]
pub(crate) fn trunc_px(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value as u32
    } else {
        0
    }
}

/// Compute the crop region for a `window_width x window_height` surface.
///
/// The base is a `size x size` square centered in the window, where
/// `size = min(width, height)`. A `Rect` shape with a positive ratio
/// shrinks the square symmetrically along one axis: ratios above 1 lose
/// height, ratios below 1 lose width. Circle and Square ignore the ratio.
pub fn compute_region(window_width: u32, window_height: u32, shape: Shape, rect_ratio: f64) -> Region {
    let size = window_width.min(window_height);
    let mut left = (window_width - size) / 2;
    let mut top = (window_height - size) / 2;
    let mut right = left + size;
    let mut bottom = top + size;

    if shape == Shape::Rect && rect_ratio.is_finite() && rect_ratio > 0.0 {
        let size_f = size as f64;
        if rect_ratio > 1.0 {
            let s = size_f * (rect_ratio - 1.0) / (2.0 * rect_ratio);
            top = trunc_px(top as f64 + s);
            bottom = trunc_px(bottom as f64 - s);
        } else {
            let s = size_f * (1.0 - rect_ratio) / 2.0;
            left = trunc_px(left as f64 + s);
            right = trunc_px(right as f64 - s);
        }
    }

    Region {
        left,
        top,
        right: right.max(left),
        bottom: bottom.max(top),
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_centered_landscape() {
        let r = compute_region(400, 300, Shape::Square, 1.0);
        assert_eq!(
            r,
            Region {
                left: 50,
                top: 0,
                right: 350,
                bottom: 300,
                size: 300
            }
        );
    }

    #[test]
    fn test_square_centered_portrait_truncates() {
        let r = compute_region(301, 500, Shape::Circle, 1.0);
        assert_eq!(r.size, 301);
        assert_eq!(r.left, 0);
        // (500 - 301) / 2 = 99.5 -> 99
        assert_eq!(r.top, 99);
        assert_eq!(r.bottom, 400);
    }

    #[test]
    fn test_rect_two_to_one() {
        let r = compute_region(300, 300, Shape::Rect, 2.0);
        assert_eq!((r.width(), r.height()), (300, 150));
        assert_eq!((r.left, r.top), (0, 75));
        // Centered: equal margins
        assert_eq!(r.top, 300 - r.bottom);
    }

    #[test]
    fn test_rect_one_to_two() {
        let r = compute_region(300, 300, Shape::Rect, 0.5);
        assert_eq!((r.width(), r.height()), (150, 300));
        assert_eq!(r.left, 300 - r.right);
    }

    #[test]
    fn test_ratio_ignored_for_square_and_circle() {
        let sq = compute_region(300, 300, Shape::Square, 2.0);
        let ci = compute_region(300, 300, Shape::Circle, 0.25);
        assert_eq!((sq.width(), sq.height()), (300, 300));
        assert_eq!((ci.width(), ci.height()), (300, 300));
    }

    #[test]
    fn test_invalid_ratio_keeps_square() {
        let r = compute_region(200, 100, Shape::Rect, -1.0);
        assert_eq!((r.width(), r.height()), (100, 100));
        let r = compute_region(200, 100, Shape::Rect, f64::INFINITY);
        assert_eq!((r.width(), r.height()), (100, 100));
    }

    #[test]
    fn test_zero_window() {
        let r = compute_region(0, 100, Shape::Square, 1.0);
        assert!(r.is_empty());
        assert_eq!(r.size, 0);
    }

    #[test]
    fn test_trunc_px() {
        assert_eq!(trunc_px(2.9), 2);
        assert_eq!(trunc_px(-3.5), 0);
        assert_eq!(trunc_px(f64::NAN), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: the region never leaves the window and never exceeds the base square.
        #[test]
        fn prop_region_inside_window(
            w in 1u32..=2000,
            h in 1u32..=2000,
            ratio in 0.05f64..20.0,
            shape in prop_oneof![Just(Shape::Circle), Just(Shape::Square), Just(Shape::Rect)],
        ) {
            let r = compute_region(w, h, shape, ratio);
            prop_assert!(r.right <= w);
            prop_assert!(r.bottom <= h);
            prop_assert!(r.width() <= r.size);
            prop_assert!(r.height() <= r.size);
        }

        /// Property: the region is centered to within one pixel of truncation.
        #[test]
        fn prop_region_centered(
            w in 1u32..=2000,
            h in 1u32..=2000,
            ratio in 0.05f64..20.0,
        ) {
            let r = compute_region(w, h, Shape::Rect, ratio);
            let left_margin = r.left as i64;
            let right_margin = w as i64 - r.right as i64;
            let top_margin = r.top as i64;
            let bottom_margin = h as i64 - r.bottom as i64;
            prop_assert!((left_margin - right_margin).abs() <= 2);
            prop_assert!((top_margin - bottom_margin).abs() <= 2);
        }

        /// Property: rect regions honor the requested ratio up to truncation.
        #[test]
        fn prop_rect_ratio_holds(
            side in 100u32..=2000,
            ratio in 0.2f64..5.0,
        ) {
            let r = compute_region(side, side, Shape::Rect, ratio);
            let actual = r.width() as f64 / r.height() as f64;
            let tolerance = 2.0 / r.width().min(r.height()) as f64 * ratio.max(1.0 / ratio);
            prop_assert!((actual - ratio).abs() / ratio <= tolerance + 1e-9,
                "ratio {} gave {}x{}", ratio, r.width(), r.height());
        }
    }
}
