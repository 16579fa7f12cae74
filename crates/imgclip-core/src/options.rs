//! Crop session configuration.
//!
//! `Options` deserializes from the same camelCase object shape a host page
//! passes in (`{ shape: "circle", rectRatio: 1.5, type: "image/jpeg" }`);
//! every field is optional and falls back to [`Options::default`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::color::Color;
use crate::decode::FilterType;
use crate::encode::OutputType;

/// Shape of the crop window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    #[default]
    Square,
    /// Ratio-locked rectangle, see [`Options::rect_ratio`].
    Rect,
}

/// Settings for a crop session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub shape: Shape,
    /// Width:height ratio, only consulted when `shape == Rect`.
    pub rect_ratio: f64,
    /// Fill behind the crop. `None` leaves PNG output transparent; JPEG
    /// output is flattened over white instead.
    pub background: Option<Color>,
    #[serde(rename = "type")]
    pub output_type: OutputType,
    /// JPEG quality in `[0, 1]`.
    pub quality: Option<f64>,
    /// Target export width in pixels. Non-positive input reads as unset.
    #[serde(deserialize_with = "deserialize_extent")]
    pub width: Option<u32>,
    /// Target export height in pixels. Non-positive input reads as unset.
    #[serde(deserialize_with = "deserialize_extent")]
    pub height: Option<u32>,
    /// Resampling filter for the export resize step.
    pub filter: FilterType,
}

/// Pixel extent from a host number, truncated toward zero.
///
/// `None` for NaN, infinities and anything below one pixel. Values past
/// `u32::MAX` saturate.
pub fn target_extent(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 1.0 {
        Some(value.min(u32::MAX as f64) as u32)
    } else {
        None
    }
}

fn deserialize_extent<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.and_then(target_extent))
}

impl Default for Options {
    fn default() -> Self {
        Self {
            shape: Shape::Square,
            rect_ratio: 1.0,
            background: None,
            output_type: OutputType::Png,
            quality: None,
            width: None,
            height: None,
            filter: FilterType::Bilinear,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Rect shape locked to `width:height`.
    pub fn with_ratio(mut self, width: f64, height: f64) -> Self {
        self.shape = Shape::Rect;
        self.rect_ratio = width / height;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_output(mut self, output_type: OutputType, quality: Option<f64>) -> Self {
        self.output_type = output_type;
        self.quality = quality;
        self
    }

    /// Ratio to apply to the region, if any.
    ///
    /// Only `Rect` consults the ratio, and only a finite positive one.
    pub fn effective_ratio(&self) -> Option<f64> {
        match self.shape {
            Shape::Rect if self.rect_ratio.is_finite() && self.rect_ratio > 0.0 => {
                Some(self.rect_ratio)
            }
            _ => None,
        }
    }

    /// Set the target width; zero is ignored.
    pub fn set_width(&mut self, width: u32) {
        if width > 0 {
            self.width = Some(width);
        }
    }

    /// Set the target height; zero is ignored.
    pub fn set_height(&mut self, height: u32) {
        if height > 0 {
            self.height = Some(height);
        }
    }

    /// Matte used when flattening transparent pixels for JPEG.
    pub fn matte(&self) -> Color {
        self.background.unwrap_or(Color::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert_eq!(opts.shape, Shape::Square);
        assert_eq!(opts.rect_ratio, 1.0);
        assert_eq!(opts.output_type, OutputType::Png);
        assert!(opts.background.is_none());
        assert!(opts.width.is_none() && opts.height.is_none());
    }

    #[test]
    fn test_ratio_only_for_rect() {
        let opts = Options::new().with_shape(Shape::Circle);
        assert_eq!(opts.effective_ratio(), None);

        let opts = Options::new().with_ratio(16.0, 9.0);
        assert_eq!(opts.shape, Shape::Rect);
        assert!((opts.effective_ratio().unwrap() - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_ratio_ignored() {
        let mut opts = Options::new().with_shape(Shape::Rect);
        opts.rect_ratio = 0.0;
        assert_eq!(opts.effective_ratio(), None);
        opts.rect_ratio = f64::NAN;
        assert_eq!(opts.effective_ratio(), None);
    }

    #[test]
    fn test_zero_dimension_ignored() {
        let mut opts = Options::new();
        opts.set_width(0);
        assert_eq!(opts.width, None);
        opts.set_width(120);
        opts.set_height(0);
        assert_eq!(opts.width, Some(120));
        assert_eq!(opts.height, None);
    }

    #[test]
    fn test_target_extent() {
        assert_eq!(target_extent(120.0), Some(120));
        assert_eq!(target_extent(99.9), Some(99));
        assert_eq!(target_extent(0.5), None);
        assert_eq!(target_extent(0.0), None);
        assert_eq!(target_extent(-1.0), None);
        assert_eq!(target_extent(f64::NAN), None);
        assert_eq!(target_extent(f64::INFINITY), None);
        assert_eq!(target_extent(1e12), Some(u32::MAX));
    }

    #[test]
    fn test_deserialize_non_positive_size_is_unset() {
        let opts: Options = serde_json::from_str(r#"{"width":0,"height":50}"#).unwrap();
        assert_eq!(opts.width, None);
        assert_eq!(opts.height, Some(50));

        let opts: Options = serde_json::from_str(r#"{"width":-1,"height":null}"#).unwrap();
        assert_eq!((opts.width, opts.height), (None, None));

        let opts: Options = serde_json::from_str(r#"{"width":64.7}"#).unwrap();
        assert_eq!(opts.width, Some(64));
    }

    #[test]
    fn test_matte_defaults_white() {
        assert_eq!(Options::new().matte(), Color::WHITE);
        let black = Options::new().with_background(Color::BLACK);
        assert_eq!(black.matte(), Color::BLACK);
    }

    #[test]
    fn test_deserialize_partial_object() {
        let json = r##"{
            "shape": "rect",
            "rectRatio": 2,
            "type": "image/jpeg",
            "quality": 0.8,
            "background": "#000",
            "width": 320
        }"##;
        let opts: Options = serde_json::from_str(json).unwrap();
        assert_eq!(opts.shape, Shape::Rect);
        assert_eq!(opts.rect_ratio, 2.0);
        assert_eq!(opts.output_type, OutputType::Jpeg);
        assert_eq!(opts.quality, Some(0.8));
        assert_eq!(opts.background, Some(Color::BLACK));
        assert_eq!(opts.width, Some(320));
        assert_eq!(opts.height, None);
        assert_eq!(opts.filter, FilterType::Bilinear);
    }

    #[test]
    fn test_deserialize_empty_object() {
        let opts: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_deserialize_rejects_unknown_shape() {
        assert!(serde_json::from_str::<Options>(r#"{"shape":"hexagon"}"#).is_err());
    }
}
