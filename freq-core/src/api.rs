//! Typed response schemas, one per endpoint, plus URL builders.
//!
//! Payloads are decoded at the gateway boundary so that chart binding and the
//! marker layer only ever see these types. Every field the server may omit is
//! an explicit `Option` or defaults to empty.

use crate::viewport::Bounds;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// One chart series as delivered by a `/<stage>_data/` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Graph {
    /// Series name, also the selector of the chart it belongs to.
    #[serde(default)]
    pub name: String,
    /// Chart data, passed through to the charting widget untouched.
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub measurement_point: Option<String>,
}

/// Response of `/<stage>_data/`, `/map__data/` and `/timeseries/<uuid>/data`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StageResponse {
    #[serde(default)]
    pub graphs: Option<Vec<Graph>>,
    #[serde(default)]
    pub statistics: Option<Vec<String>>,
    #[serde(default)]
    pub result: Option<MapResult>,
}

/// Map part of a response: locations in view and their statistics.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MapResult {
    #[serde(default)]
    pub locations: BTreeMap<String, Location>,
    #[serde(default)]
    pub timeseries: Option<TimeseriesSummary>,
}

/// A monitoring location keyed by its uuid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    /// `(lon, lat)`
    pub coordinates: (f64, f64),
    #[serde(default)]
    pub name: String,
}

/// Server-side minimum and maximum of a statistic over the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Extremes {
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub min: f64,
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub max: f64,
}

impl Extremes {
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Date span actually covered by the returned series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatesHint {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// Per-statistic extremes and per-location values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TimeseriesSummary {
    #[serde(default)]
    pub extremes: BTreeMap<String, Extremes>,
    #[serde(default)]
    pub dates: Option<DatesHint>,
    #[serde(default)]
    pub values: BTreeMap<String, BTreeMap<String, StatValue>>,
}

impl TimeseriesSummary {
    /// Value of `statistic` at `location_id`; NaN when absent.
    pub fn value(&self, location_id: &str, statistic: &str) -> f64 {
        self.values
            .get(location_id)
            .and_then(|stats| stats.get(statistic))
            .map(|v| v.0)
            .unwrap_or(f64::NAN)
    }
}

/// A statistic that may arrive as a number, a numeric string, `"NaN"` or
/// `null`. Anything non-numeric becomes NaN.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StatValue(#[serde(deserialize_with = "lenient_f64")] pub f64);

fn nan() -> f64 {
    f64::NAN
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

/// Response of the start page `/locations/` endpoint: `[[lon, lat], uuid, name]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationsResponse {
    #[serde(default)]
    pub locations: Vec<((f64, f64), String, String)>,
}

impl LocationsResponse {
    pub fn into_locations(self) -> BTreeMap<String, Location> {
        self.locations
            .into_iter()
            .map(|(coordinates, uuid, name)| (uuid, Location { coordinates, name }))
            .collect()
    }
}

/// Response of `/map/interpolation_limits/`: `[[low, high], ...]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct InterpolationLimitsResponse(pub Vec<(f64, f64)>);

/// Response of `/map/feature_info/`, shown verbatim in a popup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FeatureInfoResponse(pub serde_json::Value);

pub const LOCATIONS_PATH: &str = "/locations/";

pub fn map_locations_url(bounds: &Bounds) -> String {
    format!(
        "/map__data/?datatypes=locations&bounds={}",
        urlencoding::encode(&bounds.to_json())
    )
}

pub fn feature_info_url(lng: f64, lat: f64, layer_name: &str) -> String {
    format!(
        "/map/feature_info/?lng={}&lat={}&layername={}",
        lng,
        lat,
        urlencoding::encode(layer_name)
    )
}

pub fn interpolation_limits_url(layers: &str, bbox: &str) -> String {
    format!(
        "/map/interpolation_limits/?layers={}&bbox={}",
        urlencoding::encode(layers),
        urlencoding::encode(bbox)
    )
}

pub fn timeseries_data_url(uuid: &str) -> String {
    format!("/timeseries/{}/data", urlencoding::encode(uuid))
}
