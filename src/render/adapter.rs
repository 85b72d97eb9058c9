//! Adapter helpers between [`StyleDescriptor`] and the plotters crate.
//!
//! Plotters has no dashed polygon outline, so dashed borders are cut into
//! separate "on" pieces here (in data units) and drawn as plain paths.

use plotters::prelude::*;

use crate::color::Rgb8;
use crate::style::StyleDescriptor;

pub fn rgb_color(color: Rgb8) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

/// Region fill: fill color at the descriptor's fill opacity.
pub fn fill_style(style: &StyleDescriptor) -> ShapeStyle {
    rgb_color(style.fill_color)
        .mix(style.fill_opacity.clamp(0.0, 1.0))
        .filled()
}

/// Border stroke; weights below one pixel are drawn one pixel wide.
pub fn border_style(style: &StyleDescriptor) -> ShapeStyle {
    rgb_color(style.border_color)
        .mix(style.opacity.clamp(0.0, 1.0))
        .stroke_width(style.border_weight.round().max(1.0) as u32)
}

/// Legible label color on top of `fill`.
pub fn label_color(fill: Rgb8) -> RGBColor {
    if fill.luminance() > 0.5 {
        BLACK
    } else {
        WHITE
    }
}

/// Split a polyline into dashes of `dash` length separated by gaps of the
/// same length. Returns only the drawn pieces. A non-positive length yields
/// the whole line as one piece.
pub fn dash_segments(points: &[(f64, f64)], dash: f64) -> Vec<Vec<(f64, f64)>> {
    if points.len() < 2 {
        return Vec::new();
    }
    if dash <= 0.0 || !dash.is_finite() {
        return vec![points.to_vec()];
    }

    let mut pieces = Vec::new();
    let mut current: Vec<(f64, f64)> = vec![points[0]];
    let mut drawing = true;
    let mut left = dash;

    for pair in points.windows(2) {
        let (mut x0, mut y0) = pair[0];
        let (x1, y1) = pair[1];
        let mut seg = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();

        while seg > left {
            let t = left / seg;
            let cut = (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
            if drawing {
                current.push(cut);
                pieces.push(std::mem::take(&mut current));
            } else {
                current = vec![cut];
            }
            drawing = !drawing;
            seg -= left;
            left = dash;
            (x0, y0) = cut;
        }
        left -= seg;
        if drawing {
            current.push((x1, y1));
        }
    }
    if drawing && current.len() > 1 {
        pieces.push(current);
    }
    pieces
}
