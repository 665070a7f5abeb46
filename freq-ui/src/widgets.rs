//! Browser implementations of the chart and map widget traits.

use crate::js_bridge;
use freq_core::chart::{ChartWidget, SLOT_COUNT};
use freq_core::markers::{MapWidget, Marker};

/// DOM id of statistics display `index`.
pub fn statistic_id(index: usize) -> String {
    format!("statistic_{index}")
}

/// Wrapper element around chart slot `slot`, toggled for visibility.
pub fn slot_wrapper_id(slot: usize) -> String {
    format!("chart_slot_{slot}")
}

/// Charts drawn by D3 into `#chart_0` / `#chart_1`.
#[derive(Debug, Default)]
pub struct WebCharts {
    y_labels: [String; SLOT_COUNT],
    sizes: [Option<(f64, f64)>; SLOT_COUNT],
}

impl WebCharts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChartWidget for WebCharts {
    fn set_visible(&mut self, slot: usize, visible: bool) {
        js_bridge::set_display(&slot_wrapper_id(slot), visible);
    }

    fn rendered_size(&self, slot: usize) -> Option<(f64, f64)> {
        js_bridge::rendered_size(&slot_wrapper_id(slot))
    }

    fn set_size(&mut self, slot: usize, width: f64, height: f64) {
        self.sizes[slot] = Some((width, height));
        js_bridge::set_size(&slot_wrapper_id(slot), width, height);
    }

    fn set_y_label(&mut self, slot: usize, label: &str) {
        self.y_labels[slot] = label.to_string();
    }

    fn render(&mut self, slot: usize, target: &str, series_name: &str, data: &serde_json::Value) {
        let mut config = serde_json::json!({ "yLabel": self.y_labels[slot] });
        if let Some((width, height)) = self.sizes[slot] {
            config["width"] = width.into();
            config["height"] = height.into();
        }
        js_bridge::render_chart(target, series_name, &data.to_string(), &config.to_string());
    }

    fn set_statistic(&mut self, index: usize, text: Option<&str>) {
        let id = statistic_id(index);
        js_bridge::set_text(&id, text.unwrap_or_default());
        js_bridge::set_display(&id, text.is_some());
    }
}

/// Leaflet markers.
#[derive(Debug, Default)]
pub struct WebMap;

impl MapWidget for WebMap {
    fn clear_markers(&mut self) {
        js_bridge::clear_markers();
    }

    fn add_marker(&mut self, marker: &Marker) {
        match serde_json::to_string(marker) {
            Ok(json) => js_bridge::add_marker(&json),
            Err(e) => log::warn!("could not encode marker {}: {}", marker.location_id, e),
        }
    }
}
