//! Legend entries derived from the color scale definition.
//!
//! The legend never looks at the data: it lists every bin of the scale,
//! highest range first, so it stays stable when some bins are empty.

use crate::color::Rgb8;
use crate::scale::{ColorScale, DOMAIN_MAX};
use crate::tooltip::format_number;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: Rgb8,
    pub range_label: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Legend with `.` as decimal separator.
pub fn build_legend(scale: &ColorScale) -> Vec<LegendEntry> {
    build_legend_with(scale, '.')
}

/// One entry per bin, ordered from the highest range to the lowest, labelled
/// `"<lower>–<upper>%"`.
pub fn build_legend_with(scale: &ColorScale, decimal_sep: char) -> Vec<LegendEntry> {
    scale
        .bins()
        .iter()
        .rev()
        .map(|bin| {
            let upper = bin.upper_bound.min(DOMAIN_MAX);
            LegendEntry {
                color: bin.color,
                range_label: format!(
                    "{}\u{2013}{}%",
                    format_number(bin.lower_bound, 1, decimal_sep),
                    format_number(upper, 1, decimal_sep)
                ),
                lower_bound: bin.lower_bound,
                upper_bound: upper,
            }
        })
        .collect()
}
