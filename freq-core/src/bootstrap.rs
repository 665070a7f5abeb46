//! Page bootstrap data embedded by the server.

use crate::config::DashboardConfig;
use crate::controls::{Dropdown, Spinner};
use crate::date_range::DateRange;
use crate::error::Result;
use crate::stage::Stage;
use crate::view_state::SelectedLocation;
use serde::Deserialize;

/// DOM id of the `<script type="application/json">` element holding the data.
pub const BOOTSTRAP_ELEMENT_ID: &str = "freq-bootstrap";

#[derive(Debug, Clone, Deserialize)]
struct RawBootstrap {
    active: Stage,
    #[serde(default)]
    startpage: bool,
    start_date: String,
    end_date: String,
    #[serde(default)]
    selected_location: Option<SelectedLocation>,
    #[serde(default)]
    organisation: String,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    measurement_point: Option<String>,
    #[serde(default)]
    dropdown: Option<Dropdown>,
    #[serde(default)]
    spinner: Option<Spinner>,
    #[serde(default)]
    config: DashboardConfig,
}

/// Initial state of one page load.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub active: Stage,
    /// Location overview page: markers navigate instead of loading series.
    pub startpage: bool,
    pub date_range: DateRange,
    pub selected_location: Option<SelectedLocation>,
    pub organisation: String,
    /// Vertical reference used in chart axis labels.
    pub reference: String,
    pub measurement_point: Option<String>,
    pub dropdown: Option<Dropdown>,
    pub spinner: Option<Spinner>,
    pub config: DashboardConfig,
}

impl Bootstrap {
    /// Dates may be given as `dd-mm-yyyy` or `YYYY-MM-DD`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawBootstrap = serde_json::from_str(json)?;
        let date_range = DateRange::parse(&raw.start_date, &raw.end_date)?;
        Ok(Self {
            active: raw.active,
            startpage: raw.startpage,
            date_range,
            selected_location: raw.selected_location,
            organisation: raw.organisation,
            reference: raw.reference,
            measurement_point: raw.measurement_point,
            dropdown: raw.dropdown,
            spinner: raw.spinner,
            config: raw.config,
        })
    }
}
