//! Dashboard configuration.
//!
//! Delivered by the server inside the bootstrap JSON; every field is optional
//! and falls back to the defaults below.

use crate::chart::SLOT_COUNT;
use crate::color::Rgb;
use crate::controls::{default_capabilities, ControlCapabilities};
use crate::gateway::CsrfPolicy;
use crate::interpolation::{default_organisation_layers, LayerTable, DEFAULT_WMS_LAYER};
use crate::legend::{LegendGeometry, LegendRamp, LEGEND_STORAGE_KEY};
use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Host the dashboard is served from; an empty string means the page's
    /// own origin.
    #[serde(default)]
    pub api_host: String,
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_storage_key")]
    pub legend_storage_key: String,
    #[serde(default = "default_ramp_colors")]
    pub default_ramp: Vec<Rgb>,
    #[serde(default = "default_fallback_color")]
    pub fallback_color: Rgb,
    #[serde(default = "default_insert_color")]
    pub insert_color: Rgb,
    #[serde(default = "default_tick_width")]
    pub legend_tick_width: f64,
    #[serde(default = "default_statistic_slots")]
    pub statistic_slots: usize,
    #[serde(default = "default_statistic")]
    pub statistic: String,
    #[serde(default = "default_capabilities")]
    pub controls: BTreeMap<Stage, ControlCapabilities>,
    #[serde(default = "default_organisation_layers")]
    pub organisation_layers: BTreeMap<String, String>,
    #[serde(default = "default_wms_layer")]
    pub default_wms_layer: String,
}

fn default_csrf_cookie() -> String {
    "csrftoken".to_string()
}

fn default_csrf_header() -> String {
    "X-CSRFToken".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_storage_key() -> String {
    LEGEND_STORAGE_KEY.to_string()
}

fn default_ramp_colors() -> Vec<Rgb> {
    LegendRamp::default_ramp().colors()
}

fn default_fallback_color() -> Rgb {
    Rgb::new(0x88, 0x88, 0x88)
}

fn default_insert_color() -> Rgb {
    Rgb::WHITE
}

fn default_tick_width() -> f64 {
    6.0
}

fn default_statistic_slots() -> usize {
    SLOT_COUNT
}

fn default_statistic() -> String {
    "mean".to_string()
}

fn default_wms_layer() -> String {
    DEFAULT_WMS_LAYER.to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_host: String::new(),
            csrf_cookie: default_csrf_cookie(),
            csrf_header: default_csrf_header(),
            timeout_secs: default_timeout_secs(),
            legend_storage_key: default_storage_key(),
            default_ramp: default_ramp_colors(),
            fallback_color: default_fallback_color(),
            insert_color: default_insert_color(),
            legend_tick_width: default_tick_width(),
            statistic_slots: default_statistic_slots(),
            statistic: default_statistic(),
            controls: default_capabilities(),
            organisation_layers: default_organisation_layers(),
            default_wms_layer: default_wms_layer(),
        }
    }
}

impl DashboardConfig {
    pub fn csrf_policy(&self) -> CsrfPolicy {
        CsrfPolicy {
            api_host: self.api_host.clone(),
            cookie_name: self.csrf_cookie.clone(),
            header_name: self.csrf_header.clone(),
        }
    }

    /// The configured default ramp, or the built-in one if fewer than two
    /// colors were given.
    pub fn default_ramp(&self) -> LegendRamp {
        LegendRamp::new(self.default_ramp.iter().copied()).unwrap_or_else(|| {
            log::warn!("configured default ramp has fewer than two colors, using built-in");
            LegendRamp::default_ramp()
        })
    }

    pub fn legend_geometry(&self) -> LegendGeometry {
        LegendGeometry {
            tick_width: self.legend_tick_width,
            ..LegendGeometry::default()
        }
    }

    pub fn capabilities(&self, stage: Stage) -> ControlCapabilities {
        self.controls.get(&stage).copied().unwrap_or_default()
    }

    pub fn layer_table(&self) -> LayerTable {
        LayerTable::new(self.organisation_layers.clone(), &self.default_wms_layer)
    }
}
