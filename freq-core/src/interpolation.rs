//! Raster interpolation overlay shown under the map markers.

use crate::api::{interpolation_limits_url, InterpolationLimitsResponse};
use crate::viewport::Bounds;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_WMS_LAYER: &str = "world:dem";
pub const WMS_URL: &str = "https://raster.lizard.net/wms";
pub const COLOR_MAP: &str = "RdYlBu";
pub const OVERLAY_NAME: &str = "interpolation";

/// Organisation name to WMS layer, with a fallback for unlisted names.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerTable {
    layers: BTreeMap<String, String>,
    fallback: String,
}

impl Default for LayerTable {
    fn default() -> Self {
        Self::new(default_organisation_layers(), DEFAULT_WMS_LAYER)
    }
}

impl LayerTable {
    pub fn new(layers: BTreeMap<String, String>, fallback: &str) -> Self {
        Self {
            layers,
            fallback: fallback.to_string(),
        }
    }

    pub fn layer_for(&self, organisation: &str) -> &str {
        self.layers
            .get(organisation.trim())
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

pub fn default_organisation_layers() -> BTreeMap<String, String> {
    [
        "TNO",
        "TNO Geologische Dienst (Netherlands)",
        "International groundwater resources assessment centre (IGRAC)",
        "French Geological Survey BRGM (France)",
        "U.S. Geological Survey (United States)",
        "Databank Ondergrond Vlaanderen (Belgium)",
    ]
    .into_iter()
    .map(|org| (org.to_string(), DEFAULT_WMS_LAYER.to_string()))
    .collect()
}

/// Data range of the interpolated raster inside the current bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationLimits {
    pub low: f64,
    pub high: f64,
}

impl InterpolationLimits {
    /// First `[low, high]` pair of the response; `None` when it is empty.
    pub fn from_response(response: &InterpolationLimitsResponse) -> Option<Self> {
        response
            .0
            .first()
            .map(|&(low, high)| Self { low, high })
    }

    pub fn wms_style(&self) -> String {
        format!("{}:{}:{}", COLOR_MAP, self.low, self.high)
    }
}

/// Parameters of the WMS tile layer handed to the map widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsOverlay {
    pub url: String,
    pub layers: String,
    pub styles: String,
    pub format: String,
    pub transparent: bool,
    pub max_zoom: u8,
    pub name: String,
}

impl WmsOverlay {
    pub fn new(layer: &str, limits: InterpolationLimits) -> Self {
        Self {
            url: WMS_URL.to_string(),
            layers: layer.to_string(),
            styles: limits.wms_style(),
            format: "image/png".to_string(),
            transparent: true,
            max_zoom: 17,
            name: OVERLAY_NAME.to_string(),
        }
    }
}

/// The limits request for `organisation` over `bounds`.
pub fn limits_request_url(table: &LayerTable, organisation: &str, bounds: &Bounds) -> String {
    interpolation_limits_url(table.layer_for(organisation), &bounds.to_bbox_string())
}
