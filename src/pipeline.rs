//! Snapshot -> render instructions.
//!
//! [`Choropleth::prepare`] is a pure function of the provider state: it
//! refuses to run unless the state is [`DataState::Ready`], then joins,
//! styles, labels and builds the legend from scratch. Hosts call it every
//! time their snapshot changes and hand the plan to
//! [`crate::render::MapRenderer`].

use crate::color::Rgb8;
use crate::config::ChoroplethConfig;
use crate::error::{ChoroplethError, Result};
use crate::i18n::{Localizer, NO_DATA};
use crate::join::{JoinReport, join_with_report};
use crate::legend::{LegendEntry, build_legend_with};
use crate::models::JoinedRegion;
use crate::provider::{DataState, Snapshot};
use crate::scale::ColorScale;
use crate::style::{StyleDescriptor, StyleResolver};
use crate::tooltip::TooltipFormatter;
use log::info;
use serde::Serialize;

/// One region, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRegion<'a> {
    pub region: JoinedRegion<'a>,
    /// Palette bin of the value, `None` for no-data regions.
    pub bin: Option<usize>,
    pub style: StyleDescriptor,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan<'a> {
    pub title: String,
    pub regions: Vec<RenderedRegion<'a>>,
    pub legend_title: String,
    pub legend: Vec<LegendEntry>,
    /// Localized no-data words and fill, for a legend swatch.
    pub no_data_label: String,
    pub no_data_color: Rgb8,
    pub report: JoinReport,
}

/// Serializable view of the value-dependent parts of a plan (styles,
/// tooltips, legend), used to compare passes and to export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDigest<'p> {
    pub styles: Vec<&'p StyleDescriptor>,
    pub tooltips: Vec<&'p str>,
    pub legend: &'p [LegendEntry],
}

impl<'a> RenderPlan<'a> {
    pub fn digest(&self) -> PlanDigest<'_> {
        PlanDigest {
            styles: self.regions.iter().map(|r| &r.style).collect(),
            tooltips: self.regions.iter().map(|r| r.tooltip.as_str()).collect(),
            legend: &self.legend,
        }
    }

    /// True when at least one region is drawn in the no-data fill.
    pub fn has_missing(&self) -> bool {
        self.regions.iter().any(|r| !r.region.has_value())
    }
}

/// Scale, styles, tooltip formatting and display strings for one
/// configuration. Build once, call [`Choropleth::prepare`] per snapshot.
pub struct Choropleth<'l> {
    styles: StyleResolver,
    tooltips: TooltipFormatter<'l>,
    legend: Vec<LegendEntry>,
    title: String,
    legend_title: String,
    no_data_label: String,
}

impl<'l> Choropleth<'l> {
    pub fn new(config: &ChoroplethConfig, localizer: &'l dyn Localizer) -> Result<Self> {
        let scale = ColorScale::from_spec(&config.palette)?;
        let legend = build_legend_with(&scale, localizer.decimal_separator());
        let tooltips =
            TooltipFormatter::new(localizer, config.value_decimals).with_scale(scale.clone());
        let styles = StyleResolver::new(
            scale,
            config.border.clone(),
            config.fill_opacity,
            config.no_data_color,
        )?;
        Ok(Self {
            styles,
            tooltips,
            legend,
            title: localizer.translate(&config.title),
            legend_title: localizer.translate(&config.metric_label),
            no_data_label: localizer.translate(NO_DATA),
        })
    }

    pub fn scale(&self) -> &ColorScale {
        self.styles.scale()
    }

    pub fn styles(&self) -> &StyleResolver {
        &self.styles
    }

    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    /// Build render instructions, or [`ChoroplethError::DataNotReady`] while
    /// the provider is loading or has failed.
    pub fn prepare<'a>(&self, state: &'a DataState) -> Result<RenderPlan<'a>> {
        match state {
            DataState::Loading => Err(ChoroplethError::DataNotReady {
                reason: "loading".into(),
            }),
            DataState::Failed(msg) => Err(ChoroplethError::DataNotReady {
                reason: msg.clone(),
            }),
            DataState::Ready(snapshot) => self.plan(snapshot),
        }
    }

    pub fn plan<'a>(&self, snapshot: &'a Snapshot) -> Result<RenderPlan<'a>> {
        let (joined, report) = join_with_report(
            &snapshot.features,
            &snapshot.values.rows,
            snapshot.values.metadata.as_ref(),
        )?;

        let regions: Vec<RenderedRegion<'a>> = joined
            .into_iter()
            .map(|region| RenderedRegion {
                bin: region.value.map(|v| self.scale().bin_index(v)),
                style: self.styles.style_for(&region),
                tooltip: self.tooltips.tooltip_for(&region),
                region,
            })
            .collect();

        info!(
            "prepared {} regions ({:.0}% with data), {} legend entries",
            regions.len(),
            report.coverage() * 100.0,
            self.legend.len()
        );

        Ok(RenderPlan {
            title: self.title.clone(),
            regions,
            legend_title: self.legend_title.clone(),
            legend: self.legend.clone(),
            no_data_label: self.no_data_label.clone(),
            no_data_color: self.styles.no_data_color(),
            report,
        })
    }
}

/// One-shot convenience: build a [`Choropleth`] and prepare `state`.
pub fn render_instructions<'a>(
    state: &'a DataState,
    config: &ChoroplethConfig,
    localizer: &dyn Localizer,
) -> Result<RenderPlan<'a>> {
    Choropleth::new(config, localizer)?.prepare(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::IdentityLocalizer;

    #[test]
    fn loading_and_failed_states_do_not_run() {
        let cfg = ChoroplethConfig::default();
        let loc = IdentityLocalizer;
        let c = Choropleth::new(&cfg, &loc).unwrap();
        assert!(matches!(
            c.prepare(&DataState::Loading),
            Err(ChoroplethError::DataNotReady { .. })
        ));
        let failed = DataState::Failed("timeout".into());
        assert_eq!(
            c.prepare(&failed).unwrap_err(),
            ChoroplethError::DataNotReady {
                reason: "timeout".into()
            }
        );
    }

    #[test]
    fn bad_palette_surfaces_at_construction() {
        let cfg: ChoroplethConfig =
            serde_json::from_str(r#"{"palette": {"scheme": "Blues", "classes": 12}}"#).unwrap();
        let loc = IdentityLocalizer;
        assert!(matches!(
            Choropleth::new(&cfg, &loc),
            Err(ChoroplethError::InvalidPalette(_))
        ));
    }
}
