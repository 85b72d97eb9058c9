//! Per-region tooltip text.
//!
//! `"<name>: <value>%"` for regions with data, `"<name>: <no data>"` otherwise,
//! where the name falls back to the region id and the no-data words come
//! from the [`Localizer`]. Values print exactly as parsed unless a number
//! of decimals is configured, and rounding never moves a value into a
//! different bin than the one its region is colored with.

use crate::i18n::{Localizer, NO_DATA};
use crate::models::JoinedRegion;
use crate::scale::ColorScale;

pub struct TooltipFormatter<'l> {
    localizer: &'l dyn Localizer,
    decimals: Option<usize>,
    scale: Option<ColorScale>,
}

impl<'l> TooltipFormatter<'l> {
    pub fn new(localizer: &'l dyn Localizer, decimals: Option<usize>) -> Self {
        Self {
            localizer,
            decimals,
            scale: None,
        }
    }

    /// Keep rounded values inside the bin `scale` assigns to the raw value.
    pub fn with_scale(mut self, scale: ColorScale) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn tooltip_for(&self, region: &JoinedRegion<'_>) -> String {
        match region.value {
            Some(v) => format!("{}: {}%", region.label(), self.format_value(v)),
            None => format!("{}: {}", region.label(), self.localizer.translate(NO_DATA)),
        }
    }

    /// Shortest exact form, or rounded to the configured decimals when that
    /// does not cross a bin edge. Uses the localizer's decimal separator.
    pub fn format_value(&self, value: f64) -> String {
        let sep = self.localizer.decimal_separator();
        let Some(decimals) = self.decimals else {
            return format_exact(value, sep);
        };
        let rounded = format!("{:.*}", decimals, value).parse::<f64>().unwrap_or(value);
        match &self.scale {
            Some(scale) if scale.bin_index(rounded) != scale.bin_index(value) => {
                format_exact(value, sep)
            }
            _ => format_number(value, decimals, sep),
        }
    }
}

/// `42.0 -> "42"`, `19.96 -> "19.96"`.
pub fn format_exact(value: f64, decimal_sep: char) -> String {
    let s = value.to_string();
    let s = if s == "-0" { "0".to_string() } else { s };
    if decimal_sep != '.' {
        s.replace('.', &decimal_sep.to_string())
    } else {
        s
    }
}

/// `42.0 -> "42"`, `42.25 -> "42.3"` (1 decimal), `-0.04 -> "0"`.
pub fn format_number(value: f64, decimals: usize, decimal_sep: char) -> String {
    let mut s = format!("{:.*}", decimals, value);
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    if s == "-0" {
        s = "0".to_string();
    }
    if decimal_sep != '.' {
        s = s.replace('.', &decimal_sep.to_string());
    }
    s
}
