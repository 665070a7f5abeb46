//! Mutable record of what the page currently shows.
//!
//! Each user action that changes the view produces exactly one
//! [`DataRequest`]. Requests carry a generation number per [`Stream`]; a
//! response whose generation is no longer the latest for its stream is stale
//! and must not be applied.

use crate::api::timeseries_data_url;
use crate::date_range::DateRange;
use crate::gateway::Method;
use crate::stage::Stage;
use crate::viewport::MapViewport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Location chosen on a previous page and embedded by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub uuid: String,
    pub x: f64,
    pub y: f64,
}

/// Independent request streams; staleness is tracked per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stream {
    /// Control changes and per-location series loads.
    Controls,
    /// Map pans and zooms.
    Viewport,
}

/// A request the view wants issued, tagged for staleness checks.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRequest {
    pub stage: Stage,
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub stream: Stream,
    pub generation: u64,
}

/// Deterministic `/<stage>_data/?button=<id>&value=<json>` URL.
pub fn build_query(stage: Stage, control_id: &str, value: &serde_json::Value) -> String {
    let value_json = serde_json::to_string(value).unwrap_or_else(|_| "null".to_string());
    format!(
        "{}?button={}&value={}",
        stage.data_path(),
        urlencoding::encode(control_id),
        urlencoding::encode(&value_json)
    )
}

#[derive(Debug, Clone)]
pub struct ViewState {
    active_view: Stage,
    date_range: DateRange,
    control_values: BTreeMap<String, serde_json::Value>,
    selected_location: Option<SelectedLocation>,
    map_viewport: Option<MapViewport>,
    generations: BTreeMap<Stream, u64>,
}

impl ViewState {
    pub fn new(
        active_view: Stage,
        date_range: DateRange,
        selected_location: Option<SelectedLocation>,
    ) -> Self {
        Self {
            active_view,
            date_range,
            control_values: BTreeMap::new(),
            selected_location,
            map_viewport: None,
            generations: BTreeMap::new(),
        }
    }

    pub fn active_view(&self) -> Stage {
        self.active_view
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn control_value(&self, control_id: &str) -> Option<&serde_json::Value> {
        self.control_values.get(control_id)
    }

    pub fn selected_location(&self) -> Option<&SelectedLocation> {
        self.selected_location.as_ref()
    }

    pub fn map_viewport(&self) -> Option<&MapViewport> {
        self.map_viewport.as_ref()
    }

    pub fn set_active_view(&mut self, stage: Stage) {
        self.active_view = stage;
    }

    /// Store a new range. Returns `false`, changing nothing, when the range
    /// equals the current one.
    pub fn set_date_range(&mut self, range: DateRange) -> bool {
        if range == self.date_range {
            return false;
        }
        self.date_range = range;
        true
    }

    /// Store the raw value and produce the one refetch for it.
    pub fn set_control_value(&mut self, control_id: &str, value: serde_json::Value) -> DataRequest {
        let url = build_query(self.active_view, control_id, &value);
        self.control_values.insert(control_id.to_string(), value);
        self.issue(Stream::Controls, Method::Get, url, Vec::new())
    }

    /// Record the viewport the map opened with. Only the first call takes
    /// effect, and it issues nothing: the page's initial request is already
    /// loading, and bumping the viewport stream would make it stale.
    pub fn seed_map_viewport(&mut self, viewport: MapViewport) -> bool {
        if self.map_viewport.is_some() {
            return false;
        }
        self.map_viewport = Some(viewport);
        true
    }

    /// Store the new viewport; unchanged viewports issue nothing.
    ///
    /// A pan refetches with `bounds` alone. The `datatypes=locations` filter
    /// belongs to the initial map load only, which also lists locations
    /// without statistics.
    pub fn set_map_viewport(&mut self, viewport: MapViewport) -> Option<DataRequest> {
        if self.map_viewport.as_ref() == Some(&viewport) {
            return None;
        }
        self.map_viewport = Some(viewport);
        let params = vec![("bounds".to_string(), viewport.bounds.to_json())];
        Some(self.issue(
            Stream::Viewport,
            Method::Get,
            self.active_view.data_path(),
            params,
        ))
    }

    /// Load the charts for one location's own series.
    pub fn request_location_series(&mut self, uuid: &str) -> DataRequest {
        self.issue(
            Stream::Controls,
            Method::Get,
            timeseries_data_url(uuid),
            Vec::new(),
        )
    }

    /// Tag an arbitrary request as the newest of `stream`.
    pub fn issue(
        &mut self,
        stream: Stream,
        method: Method,
        url: String,
        params: Vec<(String, String)>,
    ) -> DataRequest {
        let generation = self.generations.entry(stream).or_insert(0);
        *generation += 1;
        DataRequest {
            stage: self.active_view,
            method,
            url,
            params,
            stream,
            generation: *generation,
        }
    }

    /// Whether `request` is still the newest of its stream.
    pub fn is_current(&self, request: &DataRequest) -> bool {
        self.generations.get(&request.stream) == Some(&request.generation)
    }
}
