use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One administrative region boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub id: String,
    pub geometry: MultiPolygon<f64>,
}

impl GeoFeature {
    pub fn new(id: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            id: id.into(),
            geometry,
        }
    }
}

/// One metric observation for one region (percentage, nominally 0–100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub dimension_key: String,
    pub region_id: String,
    pub value: f64,
}

impl MetricRow {
    pub fn new(dimension_key: impl Into<String>, region_id: impl Into<String>, value: f64) -> Self {
        Self {
            dimension_key: dimension_key.into(),
            region_id: region_id.into(),
            value,
        }
    }
}

/// Region id -> display name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricMetadata {
    names: BTreeMap<String, String>,
}

impl MetricMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, region_id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(region_id.into(), name.into());
    }

    pub fn name(&self, region_id: &str) -> Option<&str> {
        self.names.get(region_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetricMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The tabular half of a provider response. `metadata` is `None` when the
/// response carried no metadata section at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricValues {
    pub rows: Vec<MetricRow>,
    pub metadata: Option<MetricMetadata>,
}

/// A feature with its resolved value and name. Recomputed on every render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedRegion<'a> {
    pub feature: &'a GeoFeature,
    pub value: Option<f64>,
    pub display_name: Option<&'a str>,
}

impl<'a> JoinedRegion<'a> {
    pub fn id(&self) -> &'a str {
        &self.feature.id
    }

    /// Display name, falling back to the region id.
    pub fn label(&self) -> &'a str {
        self.display_name.unwrap_or(&self.feature.id)
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

// ------------------------ Analytics wire format ------------------------

/// Row-oriented analytics result as returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
    #[serde(rename = "metaData", default)]
    pub meta_data: Option<AnalyticsMetaData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    #[serde(default)]
    pub column: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsMetaData {
    #[serde(default)]
    pub items: Option<BTreeMap<String, MetaItem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaItem {
    #[serde(default)]
    pub name: Option<String>,
}

/// A table cell. The provider encodes numbers as strings, but plain JSON
/// numbers and nulls are accepted too; everything is normalized to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cell(pub String);

impl Cell {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = Cell;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a string, number or null table cell")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Cell(s.to_string()))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Cell(v.to_string()))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Cell(v.to_string()))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Cell(v.to_string()))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Cell(String::new()))
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}
