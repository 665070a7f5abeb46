//! Application state managed via Dioxus context.
//!
//! `AppState` bundles the reactive signals the components render from. It is
//! provided with `use_context_provider`; children retrieve it with
//! `use_context::<AppState>()`. The authoritative state lives in the
//! [`freq_core::Dashboard`]; these signals mirror what the page shows.

use dioxus::prelude::*;
use freq_core::controls::{ControlCapabilities, Dropdown, Spinner};
use freq_core::gateway::BusyIndicator;
use freq_core::legend::LegendLayout;
use freq_core::stage::{Affordance, Stage};

/// One tab of the stage navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub stage: Stage,
    pub affordance: Affordance,
    pub active: bool,
}

#[derive(Clone, Copy)]
pub struct AppState {
    /// Busy indicator visibility, driven by the gateway's counter
    pub busy: Signal<bool>,
    /// Dismissible request failure message
    pub error_msg: Signal<Option<String>>,
    /// Picker values, `dd-mm-yyyy`
    pub start_date: Signal<String>,
    pub end_date: Signal<String>,
    pub tabs: Signal<Vec<Tab>>,
    pub controls: Signal<ControlCapabilities>,
    pub dropdown: Signal<Option<Dropdown>>,
    pub spinner: Signal<Option<Spinner>>,
    pub legend: Signal<Option<LegendLayout>>,
    pub measurement_point: Signal<Option<String>>,
    pub organisation: Signal<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            busy: Signal::new(false),
            error_msg: Signal::new(None),
            start_date: Signal::new(String::new()),
            end_date: Signal::new(String::new()),
            tabs: Signal::new(Vec::new()),
            controls: Signal::new(ControlCapabilities::default()),
            dropdown: Signal::new(None),
            spinner: Signal::new(None),
            legend: Signal::new(None),
            measurement_point: Signal::new(None),
            organisation: Signal::new(String::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Busy indicator backed by the `busy` signal.
pub struct SignalIndicator(pub Signal<bool>);

impl BusyIndicator for SignalIndicator {
    fn show(&self) {
        let mut busy = self.0;
        busy.set(true);
    }

    fn hide(&self) {
        let mut busy = self.0;
        busy.set(false);
    }
}
