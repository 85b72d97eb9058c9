//! Render configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the stock map: RdYlBu 5-class palette, white dashed borders, a
//! gray no-data fill and the legend in the bottom-right corner.

use crate::color::Rgb8;
use crate::render::types::{DEFAULT_LEGEND_POSITION, OverlayPosition};
use crate::scale::PaletteSpec;
use crate::style::{BorderStyle, DEFAULT_NO_DATA_COLOR};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Base-map tiles a web viewer should draw under the regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders.
    pub url: String,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
        }
    }
}

/// Initial map view before the viewport is fitted to the features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [8.537, -12.321],
            zoom: 7.0,
        }
    }
}

/// How a boundary feature's region id is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureIdSource {
    /// The GeoJSON feature `id` member.
    #[default]
    FeatureId,
    /// A named member of `properties`.
    Property(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoroplethConfig {
    pub palette: PaletteSpec,
    pub no_data_color: Rgb8,
    pub border: BorderStyle,
    pub fill_opacity: f64,
    pub view: MapView,
    /// Base tiles for web output; `null` leaves them out.
    pub tiles: Option<TileLayer>,
    pub legend_position: OverlayPosition,
    /// Localizer key of the metric name, used as the legend title.
    pub metric_label: String,
    /// Localizer key of the map title.
    pub title: String,
    pub feature_id: FeatureIdSource,
    /// Round tooltip values to this many decimals; exact values when unset.
    pub value_decimals: Option<usize>,
    pub width: u32,
    pub height: u32,
    /// Draw tooltip text on top of each region in static images.
    pub labels: bool,
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            palette: PaletteSpec::default(),
            no_data_color: DEFAULT_NO_DATA_COLOR,
            border: BorderStyle::default(),
            fill_opacity: 0.8,
            view: MapView::default(),
            tiles: Some(TileLayer::default()),
            legend_position: DEFAULT_LEGEND_POSITION,
            metric_label: "Bed net usage".to_string(),
            title: "Bed net usage by district over the last 12 months".to_string(),
            feature_id: FeatureIdSource::default(),
            value_decimals: None,
            width: 1000,
            height: 600,
            labels: false,
        }
    }
}

impl ChoroplethConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: ChoroplethConfig =
            serde_json::from_str(&content).context("Failed to parse JSON configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::Scheme;
    use crate::style::LineDash;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg: ChoroplethConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ChoroplethConfig::default());
        assert_eq!(cfg.border.dash, LineDash::Dash(3));
        assert_eq!(cfg.legend_position, OverlayPosition::BottomRight);
    }

    #[test]
    fn partial_overrides() {
        let cfg: ChoroplethConfig = serde_json::from_str(
            r##"{
                "palette": {"scheme": "Blues", "classes": 4},
                "no_data_color": "#ff00ff",
                "border": {"weight": 0.5, "dash": "solid"},
                "feature_id": {"property": "code"},
                "legend_position": "top_left"
            }"##,
        )
        .unwrap();
        assert_eq!(
            cfg.palette,
            PaletteSpec::Named {
                scheme: Scheme::Blues,
                classes: 4
            }
        );
        assert_eq!(cfg.no_data_color, Rgb8::new(255, 0, 255));
        assert_eq!(cfg.border.weight, 0.5);
        assert_eq!(cfg.border.color, Rgb8::WHITE);
        assert_eq!(cfg.border.dash, LineDash::Solid);
        assert_eq!(cfg.feature_id, FeatureIdSource::Property("code".into()));
        assert_eq!(cfg.legend_position, OverlayPosition::TopLeft);
        assert_eq!(cfg.width, 1000);
        assert_eq!(cfg.tiles, Some(TileLayer::default()));
    }

    #[test]
    fn tiles_can_be_replaced_or_disabled() {
        let cfg: ChoroplethConfig = serde_json::from_str(r#"{"tiles": null}"#).unwrap();
        assert_eq!(cfg.tiles, None);
        let cfg: ChoroplethConfig = serde_json::from_str(
            r#"{"tiles": {"url": "https://tiles.example/{z}/{x}/{y}.png", "attribution": "Local"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.tiles.unwrap().attribution, "Local");
    }
}
