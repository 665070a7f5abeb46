//! Stage controls: the dropdown selector, the numeric spinner, and which of
//! them (plus the date picker) each stage page carries.

use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

pub const DATEPICKER_ID: &str = "datepicker";
pub const DROPDOWN_ID: &str = "dropdown";
pub const SPINNER_ID: &str = "spinner";
pub const GRAPH_ID: &str = "graph";

/// Which controls a stage page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlCapabilities {
    pub datepicker: bool,
    pub spinner: bool,
    pub dropdown: bool,
}

impl ControlCapabilities {
    pub const fn new(datepicker: bool, spinner: bool, dropdown: bool) -> Self {
        Self {
            datepicker,
            spinner,
            dropdown,
        }
    }
}

pub fn default_capabilities() -> BTreeMap<Stage, ControlCapabilities> {
    BTreeMap::from([
        (Stage::Map, ControlCapabilities::new(true, false, true)),
        (Stage::TrendDetection, ControlCapabilities::new(true, false, true)),
        (Stage::PeriodicFluctuations, ControlCapabilities::new(true, true, false)),
        (Stage::Autoregressive, ControlCapabilities::new(true, true, false)),
        (Stage::Additive, ControlCapabilities::new(true, false, false)),
        (Stage::Frequency, ControlCapabilities::new(true, false, false)),
    ])
}

/// A selector showing one chosen entry and a sorted list of the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dropdown {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub title: String,
    pub selected: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Dropdown {
    pub fn new(selected: impl Into<String>, options: impl IntoIterator<Item = String>) -> Self {
        let mut options: Vec<String> = options.into_iter().collect();
        options.sort();
        Self {
            heading: String::new(),
            title: String::new(),
            selected: selected.into(),
            options,
        }
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Make option `index` the selection and return the control value to send.
    ///
    /// The previous selection goes back into the option list, which is kept
    /// sorted. Out of range indices change nothing.
    pub fn choose(&mut self, index: usize) -> Option<serde_json::Value> {
        if index >= self.options.len() {
            return None;
        }
        let chosen = self.options.remove(index);
        let previous = std::mem::replace(&mut self.selected, chosen);
        self.options.push(previous);
        self.options.sort();
        Some(json!({ "value": self.selected.trim() }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spinner {
    pub number: usize,
    pub heading: String,
    pub title: String,
    pub step: f64,
    pub precision: u32,
    pub min: f64,
    pub value: f64,
}

impl Default for Spinner {
    fn default() -> Self {
        Self {
            number: 0,
            heading: String::new(),
            title: String::new(),
            step: 1.0,
            precision: 0,
            min: 0.0,
            value: 0.0,
        }
    }
}

impl Spinner {
    /// DOM id, `spinner_<n>`.
    pub fn id(&self) -> String {
        format!("spinner_{}", self.number)
    }

    /// Round to `precision` decimals and clamp to `min`.
    pub fn normalize(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.value;
        }
        let factor = 10f64.powi(self.precision as i32);
        let rounded = (value * factor).round() / factor;
        rounded.max(self.min)
    }

    /// Store `value`; returns the control value to send, or `None` when the
    /// normalized value did not change.
    pub fn set(&mut self, value: f64) -> Option<serde_json::Value> {
        let value = self.normalize(value);
        if value == self.value {
            return None;
        }
        self.value = value;
        Some(json!({ "value": value }))
    }

    /// Parse text typed into the input.
    pub fn set_text(&mut self, text: &str) -> Option<serde_json::Value> {
        text.trim().parse::<f64>().ok().and_then(|v| self.set(v))
    }

    pub fn increment(&mut self) -> Option<serde_json::Value> {
        self.set(self.value + self.step)
    }

    pub fn decrement(&mut self) -> Option<serde_json::Value> {
        self.set(self.value - self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statistics() -> Dropdown {
        Dropdown::new(
            "mean",
            ["min", "max", " median "].into_iter().map(String::from),
        )
    }

    #[test]
    fn test_dropdown_swaps_and_sorts() {
        let mut dropdown = statistics();
        assert_eq!(dropdown.options(), [" median ", "max", "min"]);
        let value = dropdown.choose(1).unwrap();
        assert_eq!(value, json!({"value": "max"}));
        assert_eq!(dropdown.selected(), "max");
        assert_eq!(dropdown.options(), [" median ", "mean", "min"]);
    }

    #[test]
    fn test_dropdown_value_is_trimmed() {
        let mut dropdown = statistics();
        let value = dropdown.choose(0).unwrap();
        assert_eq!(value, json!({"value": "median"}));
        assert_eq!(dropdown.options().len(), 3);
    }

    #[test]
    fn test_dropdown_out_of_range() {
        let mut dropdown = statistics();
        assert!(dropdown.choose(3).is_none());
        assert_eq!(dropdown.selected(), "mean");
    }

    #[test]
    fn test_spinner_id_and_rounding() {
        let mut spinner = Spinner {
            number: 2,
            step: 0.25,
            precision: 1,
            min: 1.0,
            value: 1.0,
            ..Spinner::default()
        };
        assert_eq!(spinner.id(), "spinner_2");
        assert_eq!(spinner.set(2.46), Some(json!({"value": 2.5})));
        assert_eq!(spinner.set(-4.0), Some(json!({"value": 1.0})));
        assert_eq!(spinner.set(0.5), None);
    }

    #[test]
    fn test_spinner_steps() {
        let mut spinner = Spinner::default();
        assert_eq!(spinner.increment(), Some(json!({"value": 1.0})));
        assert_eq!(spinner.decrement(), Some(json!({"value": 0.0})));
        assert_eq!(spinner.decrement(), None);
        assert_eq!(spinner.set_text(" 3 "), Some(json!({"value": 3.0})));
        assert_eq!(spinner.set_text("abc"), None);
    }

    #[test]
    fn test_capabilities_from_json() {
        let caps: ControlCapabilities = serde_json::from_str(r#"{"spinner": true}"#).unwrap();
        assert_eq!(caps, ControlCapabilities::new(false, true, false));
        assert!(default_capabilities()[&Stage::Map].dropdown);
    }
}
