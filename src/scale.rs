//! Discrete color scale over the 0–100 percentage range.
//!
//! The range is split into `N` equal-width bins, one per palette color:
//! `bin = floor(value / (100 / N))`, clamped to `0..N`. Values outside
//! `[0, 100]` land in the nearest extreme bin, so outliers degrade to the
//! extreme color instead of failing.

use crate::color::Rgb8;
use crate::error::{ChoroplethError, Result};
use serde::{Deserialize, Serialize};

/// Lower end of the value domain.
pub const DOMAIN_MIN: f64 = 0.0;
/// Upper end of the value domain.
pub const DOMAIN_MAX: f64 = 100.0;

/// ColorBrewer sequential/diverging schemes available by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheme {
    RdYlBu,
    RdYlGn,
    YlGnBu,
    Blues,
    Greens,
    Reds,
}

impl Scheme {
    /// Hex colors for `classes` (3, 4 or 5), low to high.
    fn table(self, classes: usize) -> Option<&'static [&'static str]> {
        let t: &'static [&'static str] = match (self, classes) {
            (Scheme::RdYlBu, 3) => &["#fc8d59", "#ffffbf", "#91bfdb"],
            (Scheme::RdYlBu, 4) => &["#d7191c", "#fdae61", "#abd9e9", "#2c7bb6"],
            (Scheme::RdYlBu, 5) => &["#d7191c", "#fdae61", "#ffffbf", "#abd9e9", "#2c7bb6"],
            (Scheme::RdYlGn, 3) => &["#fc8d59", "#ffffbf", "#91cf60"],
            (Scheme::RdYlGn, 4) => &["#d7191c", "#fdae61", "#a6d96a", "#1a9641"],
            (Scheme::RdYlGn, 5) => &["#d7191c", "#fdae61", "#ffffbf", "#a6d96a", "#1a9641"],
            (Scheme::YlGnBu, 3) => &["#edf8b1", "#7fcdbb", "#2c7fb8"],
            (Scheme::YlGnBu, 4) => &["#ffffcc", "#a1dab4", "#41b6c4", "#225ea8"],
            (Scheme::YlGnBu, 5) => &["#ffffcc", "#a1dab4", "#41b6c4", "#2c7fb8", "#253494"],
            (Scheme::Blues, 3) => &["#deebf7", "#9ecae1", "#3182bd"],
            (Scheme::Blues, 4) => &["#eff3ff", "#bdd7e7", "#6baed6", "#2171b5"],
            (Scheme::Blues, 5) => &["#eff3ff", "#bdd7e7", "#6baed6", "#3182bd", "#08519c"],
            (Scheme::Greens, 3) => &["#e5f5e0", "#a1d99b", "#31a354"],
            (Scheme::Greens, 4) => &["#edf8e9", "#bae4b3", "#74c476", "#238b45"],
            (Scheme::Greens, 5) => &["#edf8e9", "#bae4b3", "#74c476", "#31a354", "#006d2c"],
            (Scheme::Reds, 3) => &["#fee0d2", "#fc9272", "#de2d26"],
            (Scheme::Reds, 4) => &["#fee5d9", "#fcae91", "#fb6a4a", "#cb181d"],
            (Scheme::Reds, 5) => &["#fee5d9", "#fcae91", "#fb6a4a", "#de2d26", "#a50f15"],
            _ => return None,
        };
        Some(t)
    }
}

/// Where the palette colors come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteSpec {
    Named { scheme: Scheme, classes: usize },
    Custom(Vec<Rgb8>),
}

impl Default for PaletteSpec {
    fn default() -> Self {
        PaletteSpec::Named {
            scheme: Scheme::RdYlBu,
            classes: 5,
        }
    }
}

impl PaletteSpec {
    pub fn colors(&self) -> Result<Vec<Rgb8>> {
        match self {
            PaletteSpec::Named { scheme, classes } => scheme
                .table(*classes)
                .ok_or_else(|| {
                    ChoroplethError::InvalidPalette(format!(
                        "{:?} is available with 3, 4 or 5 classes, not {}",
                        scheme, classes
                    ))
                })?
                .iter()
                .map(|h| Rgb8::from_hex(h))
                .collect(),
            PaletteSpec::Custom(colors) => Ok(colors.clone()),
        }
    }
}

/// A contiguous sub-range of the domain and its color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorBin {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub color: Rgb8,
}

impl ColorBin {
    pub fn midpoint(&self) -> f64 {
        (self.lower_bound + self.upper_bound) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    palette: Vec<Rgb8>,
}

impl ColorScale {
    pub fn new(palette: Vec<Rgb8>) -> Result<Self> {
        if palette.is_empty() {
            return Err(ChoroplethError::InvalidPalette(
                "palette needs at least one color".into(),
            ));
        }
        Ok(Self { palette })
    }

    pub fn from_spec(spec: &PaletteSpec) -> Result<Self> {
        Self::new(spec.colors()?)
    }

    pub fn palette(&self) -> &[Rgb8] {
        &self.palette
    }

    pub fn len(&self) -> usize {
        self.palette.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palette.is_empty()
    }

    fn bin_width(&self) -> f64 {
        (DOMAIN_MAX - DOMAIN_MIN) / self.palette.len() as f64
    }

    /// Index of the bin `value` falls in. NaN maps to the lowest bin.
    pub fn bin_index(&self, value: f64) -> usize {
        let last = self.palette.len() - 1;
        let raw = ((value - DOMAIN_MIN) / self.bin_width()).floor();
        if raw.is_nan() || raw < 0.0 {
            0
        } else {
            (raw as usize).min(last)
        }
    }

    pub fn color_for(&self, value: f64) -> Rgb8 {
        self.palette[self.bin_index(value)]
    }

    /// Bins in ascending order. The last upper bound is exactly [`DOMAIN_MAX`].
    pub fn bins(&self) -> Vec<ColorBin> {
        let n = self.palette.len();
        let width = self.bin_width();
        self.palette
            .iter()
            .enumerate()
            .map(|(i, color)| ColorBin {
                lower_bound: DOMAIN_MIN + i as f64 * width,
                upper_bound: if i + 1 == n {
                    DOMAIN_MAX
                } else {
                    DOMAIN_MIN + (i + 1) as f64 * width
                },
                color: *color,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rdylbu5() -> ColorScale {
        ColorScale::from_spec(&PaletteSpec::default()).unwrap()
    }

    #[test]
    fn buckets_by_equal_width_bins() {
        let s = rdylbu5();
        assert_eq!(s.bin_index(0.0), 0);
        assert_eq!(s.bin_index(19.999), 0);
        assert_eq!(s.bin_index(20.0), 1);
        assert_eq!(s.bin_index(42.0), 2);
        assert_eq!(s.bin_index(79.9), 3);
        assert_eq!(s.bin_index(80.0), 4);
        assert_eq!(s.bin_index(100.0), 4);
    }

    #[test]
    fn clamps_out_of_range_and_nan() {
        let s = rdylbu5();
        assert_eq!(s.color_for(-5.0), s.color_for(0.0));
        assert_eq!(s.color_for(250.0), s.color_for(100.0));
        assert_eq!(s.color_for(f64::NEG_INFINITY), s.color_for(0.0));
        assert_eq!(s.color_for(f64::INFINITY), s.color_for(100.0));
        assert_eq!(s.bin_index(f64::NAN), 0);
    }

    #[test]
    fn bins_are_contiguous_and_end_at_100() {
        let s = ColorScale::from_spec(&PaletteSpec::Named {
            scheme: Scheme::Blues,
            classes: 3,
        })
        .unwrap();
        let bins = s.bins();
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].lower_bound, 0.0);
        for w in bins.windows(2) {
            assert_eq!(w[0].upper_bound, w[1].lower_bound);
        }
        assert_eq!(bins[2].upper_bound, 100.0);
    }

    #[test]
    fn unsupported_class_count_is_rejected() {
        let err = PaletteSpec::Named {
            scheme: Scheme::Reds,
            classes: 7,
        }
        .colors()
        .unwrap_err();
        assert!(matches!(err, ChoroplethError::InvalidPalette(_)));
        assert!(ColorScale::new(vec![]).is_err());
    }

    #[test]
    fn palette_spec_deserializes_both_forms() {
        let named: PaletteSpec =
            serde_json::from_str(r#"{"scheme":"YlGnBu","classes":4}"#).unwrap();
        assert_eq!(named.colors().unwrap().len(), 4);
        let custom: PaletteSpec = serde_json::from_str(r##"["#000000","#ffffff"]"##).unwrap();
        assert_eq!(custom.colors().unwrap(), vec![Rgb8::BLACK, Rgb8::WHITE]);
    }
}
