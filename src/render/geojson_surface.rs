//! Styled GeoJSON output for web maps.
//!
//! Each region becomes a `Feature` whose properties carry the resolved style
//! in simplestyle names (`fill`, `fill-opacity`, `stroke`, `stroke-width`,
//! `stroke-opacity`) plus `stroke-dasharray`, `tooltip` and `region_id`.
//! The collection's `bbox` is the fitted extent; the initial view (with the
//! base tile layer, when set) and the legend travel as foreign members.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geo::Rect;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, feature::Id};
use log::info;
use serde_json::{Value, json};

use super::{LegendOverlay, OverlayPosition, RenderSurface, StyledFeature};
use crate::config::{MapView, TileLayer};

#[derive(Debug, Clone, Default)]
pub struct GeoJsonSurface {
    out_path: Option<PathBuf>,
    view: Option<MapView>,
    tiles: Option<TileLayer>,
    features: Vec<Feature>,
    bbox: Option<Vec<f64>>,
    legend: Option<Value>,
}

impl GeoJsonSurface {
    /// Surface that keeps the collection in memory only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface that writes pretty-printed GeoJSON on present.
    pub fn to_file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            out_path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Base tiles announced in the `view` member.
    pub fn with_tiles(mut self, tiles: Option<TileLayer>) -> Self {
        self.tiles = tiles;
        self
    }

    pub fn collection(&self) -> FeatureCollection {
        let mut foreign = JsonObject::new();
        if let Some(view) = &self.view {
            let mut value = json!({"center": view.center, "zoom": view.zoom});
            if let Some(tiles) = &self.tiles {
                value["tiles"] = json!({"url": tiles.url, "attribution": tiles.attribution});
            }
            foreign.insert("view".into(), value);
        }
        if let Some(legend) = &self.legend {
            foreign.insert("legend".into(), legend.clone());
        }
        FeatureCollection {
            bbox: self.bbox.clone(),
            features: self.features.clone(),
            foreign_members: (!foreign.is_empty()).then_some(foreign),
        }
    }

    pub fn to_string_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.collection()).context("Failed to serialize GeoJSON")
    }
}

fn styled_feature(f: &StyledFeature<'_>) -> Feature {
    let s = f.style;
    let mut props = JsonObject::new();
    props.insert("region_id".into(), json!(f.feature.id));
    props.insert("tooltip".into(), json!(f.tooltip));
    props.insert("fill".into(), json!(s.fill_color.to_hex()));
    props.insert("fill-opacity".into(), json!(s.fill_opacity));
    props.insert("stroke".into(), json!(s.border_color.to_hex()));
    props.insert("stroke-width".into(), json!(s.border_weight));
    props.insert("stroke-opacity".into(), json!(s.opacity));
    if let Some(dash) = s.dash_pattern.dash_array() {
        props.insert("stroke-dasharray".into(), json!(dash));
    }
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&f.feature.geometry))),
        id: Some(Id::String(f.feature.id.clone())),
        properties: Some(props),
        foreign_members: None,
    }
}

impl RenderSurface for GeoJsonSurface {
    fn create_map(&mut self, view: &MapView) -> Result<()> {
        self.view = Some(*view);
        self.features.clear();
        self.bbox = None;
        self.legend = None;
        Ok(())
    }

    fn add_polygon_layer(&mut self, features: &[StyledFeature<'_>]) -> Result<()> {
        self.features.extend(features.iter().map(styled_feature));
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>) -> Result<()> {
        let (min, max) = (bounds.min(), bounds.max());
        self.bbox = Some(vec![min.x, min.y, max.x, max.y]);
        Ok(())
    }

    fn add_legend(&mut self, position: OverlayPosition, legend: &LegendOverlay<'_>) -> Result<()> {
        let mut value = json!({
            "position": position.control_name(),
            "title": legend.title,
            "entries": legend.entries,
        });
        if let Some((color, label)) = legend.no_data {
            value["no_data"] = json!({"color": color, "label": label});
        }
        self.legend = Some(value);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        if let Some(path) = &self.out_path {
            fs::write(path, self.to_string_pretty()?)
                .with_context(|| format!("Failed to write GeoJSON: {:?}", path))?;
            info!("wrote {} features to {}", self.features.len(), path.display());
        }
        Ok(())
    }
}
