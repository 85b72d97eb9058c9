//! Data provider snapshot: the two already-fetched collections and their
//! readiness state.
//!
//! Parsing is tolerant in the same places the join is: features that
//! cannot be drawn and rows whose value cannot be read are skipped with a
//! warning, so the affected regions end up in the no-data state.

use crate::config::FeatureIdSource;
use crate::models::{AnalyticsResponse, GeoFeature, MetricMetadata, MetricRow, MetricValues};
use anyhow::{Context, Result, anyhow, bail};
use geo::MultiPolygon;
use geojson::{GeoJson, feature::Id};
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Both collections from one provider response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub features: Vec<GeoFeature>,
    pub values: MetricValues,
}

/// What the provider currently holds. Only `Ready` may be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum DataState {
    Loading,
    Failed(String),
    Ready(Snapshot),
}

impl DataState {
    pub fn is_ready(&self) -> bool {
        matches!(self, DataState::Ready(_))
    }
}

// ------------------------ Boundaries ------------------------

/// Parse a GeoJSON `FeatureCollection` into region features.
pub fn parse_features(geojson: &str, id_source: &FeatureIdSource) -> Result<Vec<GeoFeature>> {
    let geojson: GeoJson = geojson.parse().context("Failed to parse GeoJSON")?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => bail!("GeoJSON must be a FeatureCollection"),
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.into_iter().enumerate() {
        let id = match id_source {
            FeatureIdSource::FeatureId => match &feature.id {
                Some(Id::String(s)) => Some(s.clone()),
                Some(Id::Number(n)) => Some(n.to_string()),
                None => None,
            },
            FeatureIdSource::Property(name) => {
                match feature.properties.as_ref().and_then(|p| p.get(name)) {
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                }
            }
        };
        let Some(id) = id.filter(|s| !s.is_empty()) else {
            warn!("skipping feature #{}: no region id", i);
            continue;
        };

        let geometry = match feature.geometry {
            Some(geom) => {
                let converted: geo::Geometry<f64> = match geom.value.try_into() {
                    Ok(g) => g,
                    Err(e) => {
                        warn!("skipping feature {}: unreadable geometry ({:?})", id, e);
                        continue;
                    }
                };
                match converted {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => {
                        warn!("skipping feature {}: geometry is not polygonal", id);
                        continue;
                    }
                }
            }
            None => {
                warn!("skipping feature {}: no geometry", id);
                continue;
            }
        };

        features.push(GeoFeature { id, geometry });
    }

    debug!("parsed {} boundary features", features.len());
    Ok(features)
}

// ------------------------ Metric values ------------------------

/// Column positions of (dimension key, region id, value) in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    dimension: Option<usize>,
    region: usize,
    value: usize,
}

impl Columns {
    const POSITIONAL: Columns = Columns {
        dimension: Some(0),
        region: 1,
        value: 2,
    };

    /// Positions by header name. Without headers rows are read as
    /// `[dx, ou, value]`; with headers `ou` and `value` must be named.
    fn from_headers(response: &AnalyticsResponse) -> Result<Self> {
        if response.headers.is_empty() {
            return Ok(Self::POSITIONAL);
        }
        let find = |name: &str| response.headers.iter().position(|h| h.name == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| anyhow!("analytics headers have no '{}' column", name))
        };
        Ok(Columns {
            dimension: find("dx"),
            region: required("ou")?,
            value: required("value")?,
        })
    }

    fn width(&self) -> usize {
        self.dimension
            .unwrap_or(0)
            .max(self.region)
            .max(self.value)
            + 1
    }
}

/// Parse a numeric cell; `None` for empty, unparseable or non-finite text.
fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert an analytics response into rows and metadata.
///
/// Rows that are too short or whose value cannot be parsed are dropped with
/// a warning. `metadata` is `None` if the response has no `metaData.items`.
/// Headers that do not name the `ou` and `value` columns are an error.
pub fn values_from_analytics(response: AnalyticsResponse) -> Result<MetricValues> {
    let cols = Columns::from_headers(&response)?;
    let needed = cols.width();

    let mut rows = Vec::with_capacity(response.rows.len());
    for (i, row) in response.rows.iter().enumerate() {
        if row.len() < needed {
            warn!("skipping metric row #{}: {} cells, need {}", i, row.len(), needed);
            continue;
        }
        let region_id = row[cols.region].as_str();
        match parse_value(row[cols.value].as_str()) {
            Some(value) => rows.push(MetricRow::new(
                cols.dimension.map_or("", |d| row[d].as_str()),
                region_id,
                value,
            )),
            None => warn!(
                "skipping metric row for region {}: value {:?} is not a number",
                region_id,
                row[cols.value].as_str()
            ),
        }
    }

    let metadata = response
        .meta_data
        .and_then(|m| m.items)
        .map(|items| {
            items
                .into_iter()
                .filter_map(|(id, item)| item.name.map(|name| (id, name)))
                .collect::<MetricMetadata>()
        });

    Ok(MetricValues { rows, metadata })
}

/// Parse the analytics JSON document. A provider error payload
/// (`"status": "ERROR"` or an HTTP status code >= 400) is returned as an error.
pub fn parse_analytics(json: &str) -> Result<MetricValues> {
    let v: Value = serde_json::from_str(json).context("Failed to parse analytics JSON")?;
    if let Some(message) = provider_error(&v) {
        bail!("provider error: {}", message);
    }
    let response: AnalyticsResponse =
        serde_json::from_value(v).context("Unexpected analytics response shape")?;
    values_from_analytics(response)
}

fn provider_error(v: &Value) -> Option<String> {
    let status_error = v.get("status").and_then(Value::as_str) == Some("ERROR");
    let http_error = v
        .get("httpStatusCode")
        .and_then(Value::as_u64)
        .is_some_and(|code| code >= 400);
    if status_error || http_error {
        let message = v
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        Some(message.to_string())
    } else {
        None
    }
}

/// Read metric rows from CSV with a header row naming `dx`, `ou`, `value` and
/// optionally `name`. Names found in the `name` column form the metadata, which
/// is therefore always present (possibly empty).
pub fn parse_values_csv<R: std::io::Read>(reader: R) -> Result<MetricValues> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().context("CSV has no header row")?.clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let region_idx = col("ou").ok_or_else(|| anyhow!("CSV column 'ou' not found"))?;
    let value_idx = col("value").ok_or_else(|| anyhow!("CSV column 'value' not found"))?;
    let dimension_idx = col("dx");
    let name_idx = col("name");

    let mut rows = Vec::new();
    let mut metadata = MetricMetadata::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record #{}", i))?;
        let region_id = record.get(region_idx).unwrap_or("");
        if region_id.is_empty() {
            warn!("skipping CSV record #{}: empty region id", i);
            continue;
        }
        if let Some(name) = name_idx.and_then(|j| record.get(j)).filter(|n| !n.is_empty()) {
            metadata.insert(region_id, name);
        }
        match parse_value(record.get(value_idx).unwrap_or("")) {
            Some(value) => {
                let dimension = dimension_idx.and_then(|j| record.get(j)).unwrap_or("");
                rows.push(MetricRow::new(dimension, region_id, value));
            }
            None => warn!("skipping CSV record #{} for region {}: no numeric value", i, region_id),
        }
    }

    Ok(MetricValues {
        rows,
        metadata: Some(metadata),
    })
}

/// Load both collections from disk. Errors are folded into
/// [`DataState::Failed`] so callers see the same state a live provider would
/// report.
pub fn load_state(geojson_path: &Path, values_path: &Path, id_source: &FeatureIdSource) -> DataState {
    match load_snapshot(geojson_path, values_path, id_source) {
        Ok(snapshot) => DataState::Ready(snapshot),
        Err(e) => DataState::Failed(format!("{:#}", e)),
    }
}

pub fn load_snapshot(
    geojson_path: &Path,
    values_path: &Path,
    id_source: &FeatureIdSource,
) -> Result<Snapshot> {
    let geojson = fs::read_to_string(geojson_path)
        .with_context(|| format!("Failed to read GeoJSON file: {:?}", geojson_path))?;
    let features = parse_features(&geojson, id_source)?;

    let is_csv = values_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let values = if is_csv {
        let file = fs::File::open(values_path)
            .with_context(|| format!("Failed to open CSV file: {:?}", values_path))?;
        parse_values_csv(file)?
    } else {
        let json = fs::read_to_string(values_path)
            .with_context(|| format!("Failed to read values file: {:?}", values_path))?;
        parse_analytics(&json)?
    };

    Ok(Snapshot { features, values })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_DISTRICTS: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {"type": "Feature", "id": "A", "properties": {"code": "a1"},
         "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
        {"type": "Feature", "id": 7, "properties": {"code": "b1"},
         "geometry": {"type": "MultiPolygon", "coordinates": [[[[2,0],[3,0],[3,1],[2,0]]]]}},
        {"type": "Feature", "id": "P", "properties": {},
         "geometry": {"type": "Point", "coordinates": [5,5]}},
        {"type": "Feature", "properties": {},
         "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}}
      ]
    }"#;

    #[test]
    fn features_by_id_member_skip_points_and_anonymous() {
        let f = parse_features(TWO_DISTRICTS, &FeatureIdSource::FeatureId).unwrap();
        let ids: Vec<&str> = f.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "7"]);
        assert_eq!(f[0].geometry.0.len(), 1);
    }

    #[test]
    fn features_by_property() {
        let f = parse_features(TWO_DISTRICTS, &FeatureIdSource::Property("code".into())).unwrap();
        let ids: Vec<&str> = f.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b1"]);
    }

    #[test]
    fn non_collection_is_rejected() {
        let point = r#"{"type": "Point", "coordinates": [1, 2]}"#;
        assert!(parse_features(point, &FeatureIdSource::FeatureId).is_err());
    }

    #[test]
    fn analytics_rows_use_headers_and_tolerate_bad_values() {
        let json = r#"{
          "headers": [{"name": "ou"}, {"name": "dx"}, {"name": "value"}],
          "rows": [["A", "dx1", "42"], ["B", "dx1", "n/a"], ["C", "dx1", 17.5], ["D"]],
          "metaData": {"items": {"A": {"name": "Region A"}, "dx1": {"name": "Usage"}}}
        }"#;
        let v = parse_analytics(json).unwrap();
        assert_eq!(
            v.rows,
            vec![MetricRow::new("dx1", "A", 42.0), MetricRow::new("dx1", "C", 17.5)]
        );
        let meta = v.metadata.unwrap();
        assert_eq!(meta.name("A"), Some("Region A"));
        assert_eq!(meta.name("C"), None);
    }

    #[test]
    fn analytics_headers_must_name_region_and_value() {
        let json = r#"{
          "headers": [{"name": "dx"}, {"name": "pe"}, {"name": "ou"}],
          "rows": [["dx1", "2024", "A"]],
          "metaData": {"items": {}}
        }"#;
        let err = parse_analytics(json).unwrap_err();
        assert!(format!("{:#}", err).contains("'value'"));
    }

    #[test]
    fn analytics_headers_in_any_order_without_dx() {
        let json = r#"{
          "headers": [{"name": "value"}, {"name": "pe"}, {"name": "ou"}],
          "rows": [["12.5", "2024", "A"]],
          "metaData": {"items": {}}
        }"#;
        let v = parse_analytics(json).unwrap();
        assert_eq!(v.rows, vec![MetricRow::new("", "A", 12.5)]);
    }

    #[test]
    fn analytics_without_metadata_section() {
        let v = parse_analytics(r#"{"rows": [["dx", "A", "1"]]}"#).unwrap();
        assert_eq!(v.rows.len(), 1);
        assert!(v.metadata.is_none());
    }

    #[test]
    fn provider_error_payload_is_an_error() {
        let err = parse_analytics(
            r#"{"httpStatus": "Conflict", "httpStatusCode": 409, "status": "ERROR", "message": "Dimension not found"}"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("Dimension not found"));
    }

    #[test]
    fn csv_values_with_names() {
        let data = "dx,ou,value,name\ndx1,A,42,Region A\ndx1,B,,Region B\ndx1,C,7,\n";
        let v = parse_values_csv(data.as_bytes()).unwrap();
        assert_eq!(v.rows.len(), 2);
        let meta = v.metadata.unwrap();
        assert_eq!(meta.name("B"), Some("Region B"));
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn missing_files_become_failed_state() {
        let state = load_state(
            Path::new("/definitely/not/here.geojson"),
            Path::new("/definitely/not/here.json"),
            &FeatureIdSource::FeatureId,
        );
        assert!(matches!(state, DataState::Failed(msg) if msg.contains("GeoJSON")));
    }
}
