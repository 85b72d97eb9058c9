use crate::pipeline::RenderPlan;
use serde::{Deserialize, Serialize};

/// Summary statistics for the values of one render plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub regions: usize,
    pub with_value: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Regions per palette bin, lowest bin first.
    pub per_bin: Vec<usize>,
}

/// Compute value statistics and bin counts over the plan's regions.
pub fn summarize(plan: &RenderPlan<'_>) -> Summary {
    let bins = plan.legend.len();
    let mut vals: Vec<f64> = plan.regions.iter().filter_map(|r| r.region.value).collect();
    vals.sort_by(f64::total_cmp);

    let mut per_bin = vec![0usize; bins];
    for bin in plan.regions.iter().filter_map(|r| r.bin) {
        if let Some(slot) = per_bin.get_mut(bin) {
            *slot += 1;
        }
    }

    let count = vals.len();
    let mean = if count > 0 {
        Some(vals.iter().copied().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    Summary {
        regions: plan.regions.len(),
        with_value: count,
        missing: plan.regions.len() - count,
        min: vals.first().copied(),
        max: vals.last().copied(),
        mean,
        median,
        per_bin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChoroplethConfig;
    use crate::i18n::IdentityLocalizer;
    use crate::models::{GeoFeature, MetricMetadata, MetricRow, MetricValues};
    use crate::pipeline::Choropleth;
    use crate::provider::Snapshot;
    use geo::MultiPolygon;

    #[test]
    fn counts_bins_and_missing() {
        let features = ["A", "B", "C", "D"]
            .iter()
            .map(|id| GeoFeature::new(*id, MultiPolygon::new(vec![])))
            .collect();
        let rows = vec![
            MetricRow::new("bednets", "A", 10.0),
            MetricRow::new("bednets", "B", 30.0),
            MetricRow::new("bednets", "C", 35.0),
        ];
        let snapshot = Snapshot {
            features,
            values: MetricValues {
                rows,
                metadata: Some(MetricMetadata::new()),
            },
        };
        let loc = IdentityLocalizer;
        let choropleth = Choropleth::new(&ChoroplethConfig::default(), &loc).unwrap();
        let plan = choropleth.plan(&snapshot).unwrap();
        let s = summarize(&plan);

        assert_eq!(s.regions, 4);
        assert_eq!(s.with_value, 3);
        assert_eq!(s.missing, 1);
        assert_eq!(s.min, Some(10.0));
        assert_eq!(s.max, Some(35.0));
        assert_eq!(s.median, Some(30.0));
        assert_eq!(s.mean, Some(25.0));
        assert_eq!(s.per_bin, vec![1, 2, 0, 0, 0]);
    }
}
