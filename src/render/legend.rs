//! Legend box layout and drawing for static maps.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::adapter::rgb_color;
use super::text::{estimate_text_width_px, truncate_to_width};
use super::{LegendOverlay, OverlayPosition};

// Layout constants shared by the size estimate and the drawing code.
const FONT_PX: u32 = 13;
const TITLE_FONT_PX: u32 = 14;
const PAD: i32 = 8;
const ROW_H: i32 = 20;
const SWATCH: i32 = 16;
const SWATCH_TO_TEXT: i32 = 8;
const EDGE_MARGIN: i32 = 10;
const MAX_TEXT_PX: u32 = 260;

/// Rows drawn under the title: one per entry, plus the no-data swatch.
fn rows<'a>(legend: &'a LegendOverlay<'a>) -> Vec<(RGBColor, &'a str)> {
    let mut rows: Vec<(RGBColor, &str)> = legend
        .entries
        .iter()
        .map(|e| (rgb_color(e.color), e.range_label.as_str()))
        .collect();
    if let Some((color, label)) = legend.no_data {
        rows.push((rgb_color(color), label));
    }
    rows
}

fn has_title(legend: &LegendOverlay<'_>) -> bool {
    !legend.title.trim().is_empty()
}

/// Pixel size `(w, h)` of the legend box.
pub fn legend_box_size(legend: &LegendOverlay<'_>) -> (i32, i32) {
    let rows = rows(legend);
    let label_w = rows
        .iter()
        .map(|(_, label)| estimate_text_width_px(label, FONT_PX).min(MAX_TEXT_PX))
        .max()
        .unwrap_or(0) as i32;
    let mut w = SWATCH + SWATCH_TO_TEXT + label_w;
    let mut h = rows.len() as i32 * ROW_H;
    if has_title(legend) {
        w = w.max(estimate_text_width_px(legend.title, TITLE_FONT_PX).min(MAX_TEXT_PX) as i32);
        h += TITLE_FONT_PX as i32 + 6;
    }
    (w + 2 * PAD, h + 2 * PAD)
}

/// Top-left corner of a `size` box pinned to `position` inside a
/// `canvas` of the given pixel dimensions.
pub fn legend_origin(position: OverlayPosition, canvas: (u32, u32), size: (i32, i32)) -> (i32, i32) {
    let (cw, ch) = (canvas.0 as i32, canvas.1 as i32);
    let x = if position.is_left() {
        EDGE_MARGIN
    } else {
        cw - size.0 - EDGE_MARGIN
    };
    let y = if position.is_top() {
        EDGE_MARGIN
    } else {
        ch - size.1 - EDGE_MARGIN
    };
    (x.max(0), y.max(0))
}

/// Draw the legend box onto `area` (pixel coordinates).
pub fn draw_legend_box<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    position: OverlayPosition,
    legend: &LegendOverlay<'_>,
) -> Result<()> {
    let size = legend_box_size(legend);
    let (x0, y0) = legend_origin(position, area.dim_in_pixel(), size);

    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + size.0, y0 + size.1)],
        WHITE.mix(0.85).filled(),
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + size.0, y0 + size.1)],
        RGBColor(0x99, 0x99, 0x99).stroke_width(1),
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let mut y = y0 + PAD;
    if has_title(legend) {
        let title_style = TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX))
            .pos(Pos::new(HPos::Left, VPos::Top));
        let title = truncate_to_width(legend.title, TITLE_FONT_PX, MAX_TEXT_PX);
        area.draw(&Text::new(title, (x0 + PAD, y), title_style))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        y += TITLE_FONT_PX as i32 + 6;
    }

    let label_style =
        TextStyle::from((FontFamily::SansSerif, FONT_PX)).pos(Pos::new(HPos::Left, VPos::Center));
    for (color, label) in rows(legend) {
        let sy = y + (ROW_H - SWATCH) / 2;
        area.draw(&Rectangle::new(
            [(x0 + PAD, sy), (x0 + PAD + SWATCH, sy + SWATCH)],
            color.filled(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let text = truncate_to_width(label, FONT_PX, MAX_TEXT_PX);
        area.draw(&Text::new(
            text,
            (x0 + PAD + SWATCH + SWATCH_TO_TEXT, y + ROW_H / 2),
            label_style.clone(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        y += ROW_H;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb8;
    use crate::legend::build_legend;
    use crate::scale::{ColorScale, PaletteSpec};

    #[test]
    fn no_data_row_adds_height() {
        let scale = ColorScale::from_spec(&PaletteSpec::default()).unwrap();
        let entries = build_legend(&scale);
        let mut overlay = LegendOverlay {
            title: "Bed net usage",
            entries: &entries,
            no_data: None,
        };
        let (_, h) = legend_box_size(&overlay);
        overlay.no_data = Some((Rgb8::new(0xbd, 0xbd, 0xbd), "no data"));
        let (_, h2) = legend_box_size(&overlay);
        assert_eq!(h2 - h, ROW_H);
    }

    #[test]
    fn origin_respects_corner() {
        let canvas = (1000, 600);
        let size = (120, 140);
        assert_eq!(legend_origin(OverlayPosition::TopLeft, canvas, size), (10, 10));
        assert_eq!(
            legend_origin(OverlayPosition::BottomRight, canvas, size),
            (870, 450)
        );
        assert_eq!(legend_origin(OverlayPosition::TopRight, canvas, size), (870, 10));
        assert_eq!(legend_origin(OverlayPosition::BottomLeft, canvas, size), (10, 450));
    }
}
