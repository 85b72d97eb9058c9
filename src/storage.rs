use crate::pipeline::RenderPlan;
use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One exported region: joined value, bin and resolved fill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow<'a> {
    pub region_id: &'a str,
    pub name: Option<&'a str>,
    pub value: Option<f64>,
    pub bin: Option<usize>,
    pub fill_color: String,
    pub tooltip: &'a str,
}

/// Flatten a plan into export rows, in feature order.
pub fn export_rows<'p>(plan: &'p RenderPlan<'_>) -> Vec<ExportRow<'p>> {
    plan.regions
        .iter()
        .map(|r| ExportRow {
            region_id: r.region.id(),
            name: r.region.display_name,
            value: r.region.value,
            bin: r.bin,
            fill_color: r.style.fill_color.to_hex(),
            tooltip: &r.tooltip,
        })
        .collect()
}

/// Save the joined regions as CSV with header.
pub fn save_csv<P: AsRef<Path>>(plan: &RenderPlan<'_>, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    for row in export_rows(plan) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the joined regions as pretty JSON array.
pub fn save_json<P: AsRef<Path>>(plan: &RenderPlan<'_>, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&export_rows(plan))?;
    f.write_all(s.as_bytes())?;
    Ok(())
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
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let snapshot = Snapshot {
            features: vec![
                GeoFeature::new("A", MultiPolygon::new(vec![])),
                GeoFeature::new("B", MultiPolygon::new(vec![])),
            ],
            values: MetricValues {
                rows: vec![MetricRow::new("bednets", "A", 42.0)],
                metadata: Some(MetricMetadata::from_iter([("A", "Region A")])),
            },
        };
        let loc = IdentityLocalizer;
        let plan = Choropleth::new(&ChoroplethConfig::default(), &loc)
            .unwrap()
            .plan(&snapshot)
            .unwrap();

        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        save_csv(&plan, &csvp).unwrap();
        save_json(&plan, &jsonp).unwrap();

        let csv_text = std::fs::read_to_string(&csvp).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(
            lines.next(),
            Some("region_id,name,value,bin,fill_color,tooltip")
        );
        assert_eq!(lines.next(), Some("A,Region A,42.0,2,#ffffbf,Region A: 42%"));
        assert_eq!(lines.next(), Some("B,,,,#bdbdbd,B: no data"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&jsonp).unwrap()).unwrap();
        assert_eq!(json[0]["fill_color"], "#ffffbf");
        assert!(json[1]["value"].is_null());
    }
}
