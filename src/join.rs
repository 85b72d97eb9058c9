//! Feature/metric join.
//!
//! Rows are indexed by region id in a single pass, then every feature looks
//! its value up in the index, so the join is O(features + rows). The first
//! row for a region id wins; later duplicates are reported as ambiguous.

use crate::error::{ChoroplethError, Result};
use crate::models::{GeoFeature, JoinedRegion, MetricMetadata, MetricRow};
use crate::scale::{DOMAIN_MAX, DOMAIN_MIN};
use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Recoverable conditions found while joining. None of them stops a render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JoinAnomaly {
    /// More than one row carries this region id; the first one was used.
    AmbiguousRegion { region_id: String, rows: usize },
    /// The region has a value but no display name in the metadata.
    MissingName { region_id: String },
    /// The value lies outside 0–100 and will be colored by the nearest extreme bin.
    OutOfRange { region_id: String, value: f64 },
    /// A row whose region id matches no feature.
    UnmatchedRow { region_id: String },
}

/// Join coverage and anomalies for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinReport {
    pub features: usize,
    pub matched: usize,
    /// Region ids without a metric value, in feature order.
    pub missing: Vec<String>,
    pub anomalies: Vec<JoinAnomaly>,
}

impl JoinReport {
    /// Share of features that received a value (1.0 for an empty feature set).
    pub fn coverage(&self) -> f64 {
        if self.features == 0 {
            1.0
        } else {
            self.matched as f64 / self.features as f64
        }
    }
}

/// First row per region id plus how many rows shared that id.
struct RowIndex<'r> {
    by_region: HashMap<&'r str, (&'r MetricRow, usize)>,
}

impl<'r> RowIndex<'r> {
    fn build(rows: &'r [MetricRow]) -> Self {
        let mut by_region: HashMap<&'r str, (&'r MetricRow, usize)> =
            HashMap::with_capacity(rows.len());
        for row in rows {
            by_region
                .entry(row.region_id.as_str())
                .and_modify(|(_, count)| *count += 1)
                .or_insert((row, 1));
        }
        Self { by_region }
    }

    fn get(&self, region_id: &str) -> Option<(&'r MetricRow, usize)> {
        self.by_region.get(region_id).copied()
    }
}

/// Join features with metric rows and names.
///
/// Returns one [`JoinedRegion`] per feature, in feature order. Fails only
/// when `metadata` is `None`, i.e. the provider sent no metadata section.
pub fn join<'a>(
    features: &'a [GeoFeature],
    rows: &'a [MetricRow],
    metadata: Option<&'a MetricMetadata>,
) -> Result<Vec<JoinedRegion<'a>>> {
    join_with_report(features, rows, metadata).map(|(regions, _)| regions)
}

/// Same as [`join`], also returning the coverage report. Anomalies are logged.
pub fn join_with_report<'a>(
    features: &'a [GeoFeature],
    rows: &'a [MetricRow],
    metadata: Option<&'a MetricMetadata>,
) -> Result<(Vec<JoinedRegion<'a>>, JoinReport)> {
    let metadata = metadata.ok_or(ChoroplethError::MissingMetadata)?;
    let index = RowIndex::build(rows);

    let mut report = JoinReport {
        features: features.len(),
        ..JoinReport::default()
    };

    let regions: Vec<JoinedRegion<'a>> = features
        .iter()
        .map(|feature| {
            let display_name = metadata.name(&feature.id);
            let value = match index.get(&feature.id) {
                Some((row, count)) => {
                    report.matched += 1;
                    if count > 1 {
                        warn!(
                            "region {} has {} metric rows; using the first ({})",
                            feature.id, count, row.value
                        );
                        report.anomalies.push(JoinAnomaly::AmbiguousRegion {
                            region_id: feature.id.clone(),
                            rows: count,
                        });
                    }
                    if !(DOMAIN_MIN..=DOMAIN_MAX).contains(&row.value) {
                        warn!(
                            "region {} value {} is outside {}..{}; clamping its color",
                            feature.id, row.value, DOMAIN_MIN, DOMAIN_MAX
                        );
                        report.anomalies.push(JoinAnomaly::OutOfRange {
                            region_id: feature.id.clone(),
                            value: row.value,
                        });
                    }
                    if display_name.is_none() {
                        report.anomalies.push(JoinAnomaly::MissingName {
                            region_id: feature.id.clone(),
                        });
                    }
                    Some(row.value)
                }
                None => {
                    report.missing.push(feature.id.clone());
                    None
                }
            };
            JoinedRegion {
                feature,
                value,
                display_name,
            }
        })
        .collect();

    let feature_ids: BTreeSet<&str> = features.iter().map(|f| f.id.as_str()).collect();
    let mut seen_unmatched: BTreeSet<&str> = BTreeSet::new();
    for row in rows {
        let id = row.region_id.as_str();
        if !feature_ids.contains(id) && seen_unmatched.insert(id) {
            report.anomalies.push(JoinAnomaly::UnmatchedRow {
                region_id: id.to_string(),
            });
        }
    }
    if !seen_unmatched.is_empty() {
        warn!(
            "{} metric region(s) have no boundary feature",
            seen_unmatched.len()
        );
    }

    info!(
        "joined {} features with {} rows: {} matched, {} without data",
        report.features,
        rows.len(),
        report.matched,
        report.missing.len()
    );

    Ok((regions, report))
}
