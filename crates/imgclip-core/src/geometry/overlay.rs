//! Dimmed cover layer drawn over the image while the window is open.

use image::{Rgba, RgbaImage};

use super::clip_path::ClipPath;
use super::region::Region;
use crate::options::Shape;

/// Dark fill outside the crop path (black at 70% opacity).
pub const OVERLAY_DIM: Rgba<u8> = Rgba([0, 0, 0, 179]);

/// Border stroked just inside the crop path.
pub const OVERLAY_BORDER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Render the overlay for a `width x height` window.
///
/// The whole surface is dimmed, the crop path is cleared to transparent,
/// and the path edge is stroked white.
pub fn render_overlay(width: u32, height: u32, region: &Region, shape: Shape) -> RgbaImage {
    let path = ClipPath::build(width, height, region, shape);
    RgbaImage::from_fn(width, height, |x, y| {
        if path.on_border(x, y) {
            OVERLAY_BORDER
        } else if path.contains(x, y) {
            Rgba([0, 0, 0, 0])
        } else {
            OVERLAY_DIM
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::compute_region;

    #[test]
    fn test_overlay_square() {
        let region = compute_region(8, 4, Shape::Square, 1.0);
        let overlay = render_overlay(8, 4, &region, Shape::Square);

        assert_eq!(overlay.dimensions(), (8, 4));
        // Outside the centered 4x4 square
        assert_eq!(*overlay.get_pixel(0, 0), OVERLAY_DIM);
        assert_eq!(*overlay.get_pixel(7, 3), OVERLAY_DIM);
        // Border of the square
        assert_eq!(*overlay.get_pixel(2, 0), OVERLAY_BORDER);
        // Interior is cleared
        assert_eq!(overlay.get_pixel(3, 1).0[3], 0);
    }

    #[test]
    fn test_overlay_circle_corners_dimmed() {
        let region = compute_region(20, 20, Shape::Circle, 1.0);
        let overlay = render_overlay(20, 20, &region, Shape::Circle);
        assert_eq!(*overlay.get_pixel(0, 0), OVERLAY_DIM);
        assert_eq!(*overlay.get_pixel(19, 19), OVERLAY_DIM);
        assert_eq!(overlay.get_pixel(10, 10).0[3], 0);
    }
}
