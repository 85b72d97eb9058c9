//! Map rendering: drive a [`RenderSurface`] from a [`RenderPlan`].
//!
//! The surface trait mirrors what an interactive slippy-map widget offers
//! (create a map with a view, add a styled polygon layer with tooltips,
//! fit the viewport, pin an overlay control to a corner). Two surfaces ship
//! with the crate:
//!
//! - [`PlottersSurface`] draws a static **SVG** or **PNG** with Plotters
//! - [`GeoJsonSurface`] writes a styled GeoJSON `FeatureCollection` that a
//!   web map can load as-is
//!
//! Every [`MapRenderer::draw`] call is a full redraw: the surface is
//! recreated, so nothing from a previous pass survives.

pub mod adapter;
pub mod geojson_surface;
pub mod legend;
pub mod plotters_surface;
pub mod text;
pub mod types;

pub use geojson_surface::GeoJsonSurface;
pub use plotters_surface::PlottersSurface;
pub use types::{DEFAULT_LEGEND_POSITION, OverlayPosition};

use crate::color::Rgb8;
use crate::config::{ChoroplethConfig, MapView};
use crate::legend::LegendEntry;
use crate::models::GeoFeature;
use crate::pipeline::RenderPlan;
use crate::style::StyleDescriptor;
use anyhow::Result;
use geo::{BoundingRect, Rect, coord};
use log::debug;

/// A feature with its resolved style and tooltip text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyledFeature<'a> {
    pub feature: &'a GeoFeature,
    pub style: &'a StyleDescriptor,
    pub tooltip: &'a str,
}

/// Content of the legend control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendOverlay<'a> {
    pub title: &'a str,
    pub entries: &'a [LegendEntry],
    /// Extra swatch for the no-data fill, present only when some region
    /// has no value.
    pub no_data: Option<(Rgb8, &'a str)>,
}

/// Map widget operations used by [`MapRenderer`].
pub trait RenderSurface {
    /// Start a fresh map with the initial view, discarding earlier content.
    fn create_map(&mut self, view: &MapView) -> Result<()>;
    fn add_polygon_layer(&mut self, features: &[StyledFeature<'_>]) -> Result<()>;
    /// Fit the viewport to a lon/lat bounding box.
    fn fit_bounds(&mut self, bounds: Rect<f64>) -> Result<()>;
    fn add_legend(&mut self, position: OverlayPosition, legend: &LegendOverlay<'_>) -> Result<()>;
    /// Flush the finished map (write files, swap buffers).
    fn present(&mut self) -> Result<()>;
}

/// Draws render plans with a fixed initial view and legend position.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRenderer {
    view: MapView,
    legend_position: OverlayPosition,
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new(MapView::default(), DEFAULT_LEGEND_POSITION)
    }
}

impl MapRenderer {
    pub fn new(view: MapView, legend_position: OverlayPosition) -> Self {
        Self {
            view,
            legend_position,
        }
    }

    pub fn from_config(config: &ChoroplethConfig) -> Self {
        Self::new(config.view, config.legend_position)
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn legend_position(&self) -> OverlayPosition {
        self.legend_position
    }

    /// Create the map, add one polygon layer, fit to it (unless there is
    /// nothing to fit), add the legend, present.
    pub fn draw<S>(&self, plan: &RenderPlan<'_>, surface: &mut S) -> Result<()>
    where
        S: RenderSurface + ?Sized,
    {
        surface.create_map(&self.view)?;

        let features: Vec<StyledFeature<'_>> = plan
            .regions
            .iter()
            .map(|r| StyledFeature {
                feature: r.region.feature,
                style: &r.style,
                tooltip: r.tooltip.as_str(),
            })
            .collect();
        surface.add_polygon_layer(&features)?;

        match layer_bounds(features.iter().map(|f| f.feature)) {
            Some(bounds) => surface.fit_bounds(bounds)?,
            None => debug!("layer has no extent; keeping the initial view"),
        }

        let legend = LegendOverlay {
            title: &plan.legend_title,
            entries: &plan.legend,
            no_data: plan
                .has_missing()
                .then_some((plan.no_data_color, plan.no_data_label.as_str())),
        };
        surface.add_legend(self.legend_position, &legend)?;

        surface.present()
    }
}

/// Union of the features' bounding boxes, `None` when no feature has any
/// coordinates.
pub fn layer_bounds<'a, I>(features: I) -> Option<Rect<f64>>
where
    I: IntoIterator<Item = &'a GeoFeature>,
{
    features
        .into_iter()
        .filter_map(|f| f.geometry.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, polygon};

    fn square(id: &str, x: f64, y: f64) -> GeoFeature {
        GeoFeature::new(
            id,
            MultiPolygon::new(vec![polygon![
                (x: x, y: y),
                (x: x + 1.0, y: y),
                (x: x + 1.0, y: y + 1.0),
                (x: x, y: y + 1.0),
            ]]),
        )
    }

    #[test]
    fn bounds_cover_all_features() {
        let fs = vec![square("A", -13.0, 7.0), square("B", -11.0, 9.0)];
        let r = layer_bounds(&fs).unwrap();
        assert_eq!(r.min(), coord! { x: -13.0, y: 7.0 });
        assert_eq!(r.max(), coord! { x: -10.0, y: 10.0 });
    }

    #[test]
    fn empty_geometries_have_no_bounds() {
        let fs = vec![GeoFeature::new("X", MultiPolygon::new(vec![]))];
        assert!(layer_bounds(&fs).is_none());
        assert!(layer_bounds(std::iter::empty()).is_none());
    }

    #[test]
    fn renderer_takes_view_and_position_from_config() {
        let config = ChoroplethConfig {
            view: MapView {
                center: [0.0, 10.0],
                zoom: 4.0,
            },
            legend_position: OverlayPosition::TopLeft,
            ..ChoroplethConfig::default()
        };
        let renderer = MapRenderer::from_config(&config);
        assert_eq!(renderer.view(), &config.view);
        assert_eq!(renderer.legend_position(), OverlayPosition::TopLeft);
        assert_eq!(MapRenderer::default().legend_position(), DEFAULT_LEGEND_POSITION);
    }
}
