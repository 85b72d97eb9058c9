//! choromap
//!
//! Join a per-region metric onto boundary polygons and render it as a
//! choropleth: a fixed 0–100 % color scale, a no-data fill, tooltips and a
//! legend. Pairs with the `choromap` CLI.
//!
//! ### Features
//! - Load boundaries from GeoJSON and values from an analytics JSON
//!   response or a `dx,ou,value[,name]` CSV
//! - Equal-width ColorBrewer palettes (or a custom hex list) over 0–100 %
//! - Localized tooltips and legend labels
//! - Draw to SVG/PNG with Plotters, or write styled GeoJSON for web maps
//! - Export the joined table as CSV or JSON and print quick statistics
//!
//! ### Example
//! ```no_run
//! use choromap::{ChoroplethConfig, Choropleth, IdentityLocalizer, MapRenderer, PlottersSurface};
//! use choromap::provider::load_state;
//! use std::path::Path;
//!
//! let config = ChoroplethConfig::default();
//! let state = load_state(
//!     Path::new("districts.geojson"),
//!     Path::new("bednets.json"),
//!     &config.feature_id,
//! );
//! let localizer = IdentityLocalizer;
//! let plan = Choropleth::new(&config, &localizer)?.prepare(&state)?;
//! let mut surface = PlottersSurface::from_config("bednets.svg", &config).with_title(&plan.title);
//! MapRenderer::from_config(&config).draw(&plan, &mut surface)?;
//! let stats = choromap::stats::summarize(&plan);
//! println!("{:#?}", stats);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod i18n;
pub mod join;
pub mod legend;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod render;
pub mod scale;
pub mod stats;
pub mod storage;
pub mod style;
pub mod tooltip;

pub use color::Rgb8;
pub use config::{ChoroplethConfig, FeatureIdSource, MapView, TileLayer};
pub use error::ChoroplethError;
pub use i18n::{Catalog, IdentityLocalizer, Localizer};
pub use join::{JoinReport, join};
pub use legend::{LegendEntry, build_legend};
pub use models::{GeoFeature, JoinedRegion, MetricMetadata, MetricRow, MetricValues};
pub use pipeline::{Choropleth, RenderPlan, render_instructions};
pub use provider::{DataState, Snapshot};
pub use render::{GeoJsonSurface, MapRenderer, OverlayPosition, PlottersSurface, RenderSurface};
pub use scale::{ColorScale, PaletteSpec, Scheme};
pub use style::{StyleDescriptor, StyleResolver};
pub use tooltip::TooltipFormatter;
