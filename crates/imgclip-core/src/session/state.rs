//! Session state carried between calls.

use serde::{Deserialize, Serialize};

use crate::geometry::{compute_region, Region};
use crate::options::Options;

/// Load lifecycle of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Nothing has been loaded.
    #[default]
    Idle,
    /// A decode is in flight.
    Loading,
    /// A source image is present and the transform covers the region.
    Loaded,
}

/// What the surface should display on top of the image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Affordance {
    #[default]
    None,
    Loading,
    /// Nothing loaded yet; the host shows a pick-file prompt.
    Empty,
    Error(String),
}

/// Pixel extent of the interactive surface and the region derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportWindow {
    pub width: u32,
    pub height: u32,
    pub region: Region,
}

impl ViewportWindow {
    pub fn new(width: u32, height: u32, options: &Options) -> Self {
        let ratio = options.effective_ratio().unwrap_or(1.0);
        Self {
            width,
            height,
            region: compute_region(width, height, options.shape, ratio),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Shape;

    #[test]
    fn test_window_region_follows_options() {
        let window = ViewportWindow::new(300, 300, &Options::new().with_ratio(2.0, 1.0));
        assert_eq!((window.region.width(), window.region.height()), (300, 150));

        let window = ViewportWindow::new(300, 300, &Options::new().with_shape(Shape::Circle));
        assert_eq!((window.region.width(), window.region.height()), (300, 300));
    }

    #[test]
    fn test_empty_window() {
        assert!(ViewportWindow::default().is_empty());
        let window = ViewportWindow::new(0, 10, &Options::default());
        assert!(window.is_empty());
        assert!(window.region.is_empty());
    }

    #[test]
    fn test_affordance_serializes_tagged() {
        let json = serde_json::to_string(&Affordance::Error("bad".into())).unwrap();
        assert_eq!(json, r#"{"kind":"error","message":"bad"}"#);
        let json = serde_json::to_string(&Affordance::Empty).unwrap();
        assert_eq!(json, r#"{"kind":"empty"}"#);
    }
}
