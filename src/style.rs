//! Per-region style resolution.
//!
//! The fill is the only value-dependent attribute. Border color, weight,
//! opacity and dash pattern are shared by every region. Regions without a
//! value get a dedicated no-data fill that never coincides with a palette
//! color.

use crate::color::Rgb8;
use crate::error::{ChoroplethError, Result};
use crate::models::JoinedRegion;
use crate::scale::ColorScale;
use serde::{Deserialize, Serialize};

/// Border dash pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDash {
    Solid,
    /// Equal dash and gap length, in pixels.
    Dash(u32),
}

impl LineDash {
    /// SVG / Leaflet `dashArray` notation, `None` for solid lines.
    pub fn dash_array(self) -> Option<String> {
        match self {
            LineDash::Solid => None,
            LineDash::Dash(n) => Some(n.to_string()),
        }
    }
}

/// Region outline settings shared by all regions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderStyle {
    pub color: Rgb8,
    pub weight: f64,
    pub opacity: f64,
    pub dash: LineDash,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            color: Rgb8::WHITE,
            weight: 1.5,
            opacity: 1.0,
            dash: LineDash::Dash(3),
        }
    }
}

/// Everything a surface needs to paint one region.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StyleDescriptor {
    pub fill_color: Rgb8,
    pub fill_opacity: f64,
    pub border_color: Rgb8,
    pub border_weight: f64,
    pub opacity: f64,
    pub dash_pattern: LineDash,
}

/// Default fill for regions without data (neutral gray).
pub const DEFAULT_NO_DATA_COLOR: Rgb8 = Rgb8::new(0xbd, 0xbd, 0xbd);

#[derive(Clone, Debug)]
pub struct StyleResolver {
    scale: ColorScale,
    border: BorderStyle,
    fill_opacity: f64,
    no_data_color: Rgb8,
}

impl StyleResolver {
    /// Fails if `no_data_color` equals any palette color.
    pub fn new(
        scale: ColorScale,
        border: BorderStyle,
        fill_opacity: f64,
        no_data_color: Rgb8,
    ) -> Result<Self> {
        if scale.palette().contains(&no_data_color) {
            return Err(ChoroplethError::NoDataColorAliasesPalette(
                no_data_color.to_hex(),
            ));
        }
        Ok(Self {
            scale,
            border,
            fill_opacity: fill_opacity.clamp(0.0, 1.0),
            no_data_color,
        })
    }

    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    pub fn no_data_color(&self) -> Rgb8 {
        self.no_data_color
    }

    fn with_fill(&self, fill_color: Rgb8) -> StyleDescriptor {
        StyleDescriptor {
            fill_color,
            fill_opacity: self.fill_opacity,
            border_color: self.border.color,
            border_weight: self.border.weight,
            opacity: self.border.opacity,
            dash_pattern: self.border.dash,
        }
    }

    pub fn style_for(&self, region: &JoinedRegion<'_>) -> StyleDescriptor {
        match region.value {
            Some(v) => self.with_fill(self.scale.color_for(v)),
            None => self.no_data_style(),
        }
    }

    pub fn no_data_style(&self) -> StyleDescriptor {
        self.with_fill(self.no_data_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoFeature;
    use crate::scale::PaletteSpec;
    use geo::MultiPolygon;

    fn resolver() -> StyleResolver {
        let scale = ColorScale::from_spec(&PaletteSpec::default()).unwrap();
        StyleResolver::new(scale, BorderStyle::default(), 0.8, DEFAULT_NO_DATA_COLOR).unwrap()
    }

    #[test]
    fn value_drives_fill_only() {
        let r = resolver();
        let f = GeoFeature::new("A", MultiPolygon::new(vec![]));
        let low = r.style_for(&JoinedRegion { feature: &f, value: Some(5.0), display_name: None });
        let high = r.style_for(&JoinedRegion { feature: &f, value: Some(95.0), display_name: None });
        assert_ne!(low.fill_color, high.fill_color);
        assert_eq!(low.border_color, high.border_color);
        assert_eq!(low.border_weight, 1.5);
        assert_eq!(low.dash_pattern.dash_array().as_deref(), Some("3"));
        assert_eq!(low.fill_opacity, 0.8);
    }

    #[test]
    fn absent_value_uses_no_data_fill() {
        let r = resolver();
        let f = GeoFeature::new("B", MultiPolygon::new(vec![]));
        let style = r.style_for(&JoinedRegion { feature: &f, value: None, display_name: None });
        assert_eq!(style, r.no_data_style());
        assert!(!r.scale().palette().contains(&style.fill_color));
    }

    #[test]
    fn aliasing_no_data_color_is_rejected() {
        let scale = ColorScale::from_spec(&PaletteSpec::default()).unwrap();
        let clash = scale.palette()[2];
        let err = StyleResolver::new(scale, BorderStyle::default(), 0.8, clash).unwrap_err();
        assert!(matches!(err, ChoroplethError::NoDataColorAliasesPalette(_)));
    }
}
