//! Static map surface backed by Plotters: **SVG** or **PNG** by file extension.
//!
//! The surface records what the renderer asks for and draws everything in
//! [`RenderSurface::present`]. Longitude maps to x and latitude to y in an
//! equirectangular projection with a uniform scale on both axes. There are
//! no base-map tiles; the canvas is plain white.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Result, anyhow};
use geo::{Centroid, LineString, MultiPolygon, Rect, TriangulateEarcut};
use log::{debug, info};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use super::adapter::{border_style, dash_segments, fill_style, label_color};
use super::legend::draw_legend_box;
use super::text::truncate_to_width;
use super::{LegendOverlay, OverlayPosition, RenderSurface, StyledFeature};
use crate::color::Rgb8;
use crate::config::{ChoroplethConfig, MapView};
use crate::legend::LegendEntry;
use crate::style::{LineDash, StyleDescriptor};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

const MARGIN: u32 = 12;
const TITLE_H: u32 = 36;
const TITLE_FONT_PX: u32 = 20;
const LABEL_FONT_PX: u32 = 11;
/// Extra room around fitted bounds, as a share of their span.
const FIT_PADDING: f64 = 0.05;
/// Leaflet tile size; zoom `z` shows `256 * 2^z` pixels per 360° of longitude.
const TILE_PX: f64 = 256.0;

#[derive(Debug, Clone)]
struct Shape {
    geometry: MultiPolygon<f64>,
    style: StyleDescriptor,
    tooltip: String,
}

#[derive(Debug, Clone)]
struct OwnedLegend {
    position: OverlayPosition,
    title: String,
    entries: Vec<LegendEntry>,
    no_data: Option<(Rgb8, String)>,
}

impl OwnedLegend {
    fn overlay(&self) -> LegendOverlay<'_> {
        LegendOverlay {
            title: &self.title,
            entries: &self.entries,
            no_data: self.no_data.as_ref().map(|(c, l)| (*c, l.as_str())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlottersSurface {
    out_path: PathBuf,
    width: u32,
    height: u32,
    title: Option<String>,
    labels: bool,
    view: MapView,
    shapes: Vec<Shape>,
    bounds: Option<Rect<f64>>,
    legend: Option<OwnedLegend>,
}

impl PlottersSurface {
    pub fn new<P: AsRef<Path>>(out_path: P, width: u32, height: u32) -> Self {
        Self {
            out_path: out_path.as_ref().to_path_buf(),
            width: width.max(1),
            height: height.max(1),
            title: None,
            labels: false,
            view: MapView::default(),
            shapes: Vec::new(),
            bounds: None,
            legend: None,
        }
    }

    /// Size and labels from the configuration; no title.
    pub fn from_config<P: AsRef<Path>>(out_path: P, config: &ChoroplethConfig) -> Self {
        Self::new(out_path, config.width, config.height).with_labels(config.labels)
    }

    /// Caption drawn above the map. Blank titles are ignored.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = (!title.trim().is_empty()).then_some(title);
        self
    }

    /// Draw each region's tooltip text at its centroid.
    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }

    /// Render the current scene as an SVG document in memory.
    pub fn render_svg_string(&self) -> Result<String> {
        ensure_fonts_registered();
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, (self.width, self.height))
                .into_drawing_area();
            self.draw_scene(root)?;
        }
        Ok(buf)
    }

    fn draw_scene<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

        let map_area = match &self.title {
            Some(title) => {
                let (title_area, rest) = root.split_vertically(TITLE_H);
                let (tw, th) = title_area.dim_in_pixel();
                let style = TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX))
                    .pos(Pos::new(HPos::Center, VPos::Center));
                let text = truncate_to_width(title, TITLE_FONT_PX, tw.saturating_sub(2 * MARGIN));
                title_area
                    .draw(&Text::new(text, (tw as i32 / 2, th as i32 / 2), style))
                    .map_err(|e| anyhow!("{:?}", e))?;
                rest
            }
            None => root.clone(),
        };
        let map_area = map_area.margin(MARGIN, MARGIN, MARGIN, MARGIN);

        let (x_range, y_range) = viewport(&self.view, self.bounds, map_area.dim_in_pixel());
        let units_per_px = (x_range.end - x_range.start) / map_area.dim_in_pixel().0.max(1) as f64;
        let chart = ChartBuilder::on(&map_area)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| anyhow!("{:?}", e))?;
        let plot = chart.plotting_area();

        // Fills first so every border stays visible.
        for shape in &self.shapes {
            let fill = fill_style(&shape.style);
            for polygon in &shape.geometry {
                for triangle in fill_triangles(polygon) {
                    plot.draw(&Polygon::new(triangle, fill))
                        .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }

        for shape in &self.shapes {
            let stroke = border_style(&shape.style);
            for polygon in &shape.geometry {
                for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                    let points = ring_points(ring);
                    let pieces = match shape.style.dash_pattern {
                        LineDash::Solid => vec![points],
                        LineDash::Dash(px) => dash_segments(&points, px as f64 * units_per_px),
                    };
                    for piece in pieces {
                        plot.draw(&PathElement::new(piece, stroke))
                            .map_err(|e| anyhow!("{:?}", e))?;
                    }
                }
            }
        }

        if self.labels {
            for shape in &self.shapes {
                let Some(center) = shape.geometry.centroid() else {
                    continue;
                };
                let color = label_color(shape.style.fill_color);
                let style = TextStyle::from((FontFamily::SansSerif, LABEL_FONT_PX))
                    .color(&color)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                let text = truncate_to_width(&shape.tooltip, LABEL_FONT_PX, 160);
                plot.draw(&Text::new(text, (center.x(), center.y()), style))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }

        if let Some(legend) = &self.legend {
            draw_legend_box(&root, legend.position, &legend.overlay())?;
        }

        root.present().map_err(|e| anyhow!("{:?}", e))?;
        Ok(())
    }
}

fn ring_points(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    ring.coords().map(|c| (c.x, c.y)).collect()
}

/// Cover the area between a polygon's exterior and its holes with
/// triangles. Plotters polygons have no interior rings, and whatever lies
/// under a hole (an enclave, another region) must stay visible.
fn fill_triangles(polygon: &geo::Polygon<f64>) -> Vec<Vec<(f64, f64)>> {
    polygon
        .earcut_triangles_iter()
        .map(|t| t.to_array().iter().map(|c| (c.x, c.y)).collect())
        .collect()
}

/// Longitude and latitude ranges shown in a plot of `plot_px` pixels.
///
/// With fitted bounds the padded box is centered and the shorter side
/// widened so both axes share one scale. Without bounds the view's center
/// and zoom decide.
pub fn viewport(
    view: &MapView,
    bounds: Option<Rect<f64>>,
    plot_px: (u32, u32),
) -> (Range<f64>, Range<f64>) {
    let (pw, ph) = (plot_px.0.max(1) as f64, plot_px.1.max(1) as f64);
    let (cx, cy, units_per_px) = match bounds {
        Some(rect) => {
            let center = rect.center();
            let span_x = (rect.width() * (1.0 + 2.0 * FIT_PADDING)).max(1e-6);
            let span_y = (rect.height() * (1.0 + 2.0 * FIT_PADDING)).max(1e-6);
            (center.x, center.y, (span_x / pw).max(span_y / ph))
        }
        None => (
            view.center[1],
            view.center[0],
            360.0 / (TILE_PX * 2f64.powf(view.zoom)),
        ),
    };
    let half_x = units_per_px * pw / 2.0;
    let half_y = units_per_px * ph / 2.0;
    ((cx - half_x)..(cx + half_x), (cy - half_y)..(cy + half_y))
}

impl RenderSurface for PlottersSurface {
    fn create_map(&mut self, view: &MapView) -> Result<()> {
        self.view = *view;
        self.shapes.clear();
        self.bounds = None;
        self.legend = None;
        Ok(())
    }

    fn add_polygon_layer(&mut self, features: &[StyledFeature<'_>]) -> Result<()> {
        self.shapes.extend(features.iter().map(|f| Shape {
            geometry: f.feature.geometry.clone(),
            style: f.style.clone(),
            tooltip: f.tooltip.to_string(),
        }));
        debug!("polygon layer: {} features", features.len());
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>) -> Result<()> {
        self.bounds = Some(bounds);
        Ok(())
    }

    fn add_legend(&mut self, position: OverlayPosition, legend: &LegendOverlay<'_>) -> Result<()> {
        self.legend = Some(OwnedLegend {
            position,
            title: legend.title.to_string(),
            entries: legend.entries.to_vec(),
            no_data: legend.no_data.map(|(c, l)| (c, l.to_string())),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        ensure_fonts_registered();
        let size = (self.width, self.height);
        if self.out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
            let root = SVGBackend::new(&self.out_path, size).into_drawing_area();
            self.draw_scene(root)?;
        } else {
            let root = BitMapBackend::new(&self.out_path, size).into_drawing_area();
            self.draw_scene(root)?;
        }
        info!("wrote map to {}", self.out_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn initial_view_follows_zoom() {
        let (x, y) = viewport(&MapView::default(), None, (1024, 512));
        let span = 1024.0 * 360.0 / (256.0 * 128.0);
        assert!((x.end - x.start - span).abs() < 1e-9);
        assert!(((x.start + x.end) / 2.0 - -12.321).abs() < 1e-9);
        assert!(((y.start + y.end) / 2.0 - 8.537).abs() < 1e-9);
        assert!((y.end - y.start - span / 2.0).abs() < 1e-9);
    }

    #[test]
    fn fitted_bounds_keep_aspect() {
        let rect = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 2.0, y: 1.0 });
        let (x, y) = viewport(&MapView::default(), Some(rect), (400, 400));
        let (sx, sy) = (x.end - x.start, y.end - y.start);
        assert!((sx - sy).abs() < 1e-9);
        assert!(sx >= 2.0);
        assert!(x.start <= 0.0 && x.end >= 2.0 && y.start <= 0.0 && y.end >= 1.0);
    }

    #[test]
    fn fill_triangles_leave_holes_open() {
        use geo::{Area, polygon};
        let square = polygon![
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 3.0, y: 1.0), (x: 3.0, y: 3.0), (x: 1.0, y: 3.0)]]
        ];
        let triangles = fill_triangles(&square);
        assert!(!triangles.is_empty());

        let mut area = 0.0;
        for t in &triangles {
            assert_eq!(t.len(), 3);
            let tri = geo::Triangle::new(
                coord! { x: t[0].0, y: t[0].1 },
                coord! { x: t[1].0, y: t[1].1 },
                coord! { x: t[2].0, y: t[2].1 },
            );
            area += tri.unsigned_area();
            let c = tri.centroid();
            let inside_hole = c.x() > 1.0 && c.x() < 3.0 && c.y() > 1.0 && c.y() < 3.0;
            assert!(!inside_hole, "triangle centered at {:?} covers the hole", c);
        }
        assert!((area - 12.0).abs() < 1e-9);
    }

    #[test]
    fn blank_titles_are_dropped() {
        let s = PlottersSurface::new("map.svg", 10, 10).with_title("  ");
        assert!(s.title.is_none());
    }
}
