//! Root controller tying view state, stage progression, charts, markers and
//! the legend together.
//!
//! Interaction handlers return the [`DataRequest`] to issue (if any). The
//! caller sends it through a [`Gateway`](crate::gateway::Gateway) and hands
//! the delivered response back to one of the `apply_*` methods together with
//! the original request, so stale responses can be dropped.

use crate::api::{
    map_locations_url, FeatureInfoResponse, InterpolationLimitsResponse, Location,
    LocationsResponse, StageResponse, TimeseriesSummary, LOCATIONS_PATH,
};
use crate::bootstrap::Bootstrap;
use crate::chart::{BindOutcome, ChartSlots, ChartWidget};
use crate::color::Rgb;
use crate::config::DashboardConfig;
use crate::controls::{
    ControlCapabilities, Dropdown, Spinner, DATEPICKER_ID, DROPDOWN_ID, GRAPH_ID, SPINNER_ID,
};
use crate::date_range::{parse_date, DateRange};
use crate::error::Result;
use crate::gateway::{Delivered, Method};
use crate::interpolation::{limits_request_url, InterpolationLimits, LayerTable, WmsOverlay};
use crate::legend::{LegendEditor, LegendLayout, RampStore};
use crate::markers::{ClickAction, MapWidget, MarkerLayer, MarkerMode};
use crate::stage::{Affordance, Stage, StageGraph, StageProgression};
use crate::view_state::{DataRequest, SelectedLocation, Stream, ViewState};
use crate::viewport::{Bounds, MapViewport};
use std::collections::BTreeMap;

/// Result of handing a delivered response to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// A newer request of the same stream is outstanding; nothing changed.
    Stale,
    Applied(ApplyReport),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApplyReport {
    pub charts: Option<BindOutcome>,
    pub markers: Option<usize>,
    pub unlocked: Vec<Stage>,
    /// The response moved the date range; pickers need updating.
    pub dates_changed: bool,
}

/// What a marker click asks the page to do.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerClick {
    Navigate(String),
    Load(DataRequest),
}

pub struct Dashboard<S> {
    config: DashboardConfig,
    view: ViewState,
    progression: StageProgression,
    legend: LegendEditor<S>,
    charts: ChartSlots,
    markers: MarkerLayer,
    layers: LayerTable,
    dropdown: Option<Dropdown>,
    spinner: Option<Spinner>,
    organisation: String,
    measurement_point: Option<String>,
    statistic: String,
    startpage: bool,
    locations: BTreeMap<String, Location>,
    timeseries: Option<TimeseriesSummary>,
}

impl<S: RampStore> Dashboard<S> {
    pub fn new(boot: Bootstrap, store: S) -> Self {
        Self::with_graph(boot, store, StageGraph::default())
    }

    pub fn with_graph(boot: Bootstrap, store: S, graph: StageGraph) -> Self {
        let config = boot.config;
        let caps = config.capabilities(boot.active);
        let legend = LegendEditor::load(
            store,
            &config.legend_storage_key,
            config.default_ramp(),
            config.insert_color,
        );
        let mut charts = ChartSlots::standard(config.statistic_slots);
        charts.set_reference(&boot.reference);
        let mode = if boot.startpage {
            MarkerMode::Navigate
        } else {
            marker_mode(boot.active)
        };
        log::info!(
            "Dashboard starting on {} ({:?} markers, {})",
            boot.active,
            mode,
            boot.date_range.picker_value()
        );
        Self {
            view: ViewState::new(boot.active, boot.date_range, boot.selected_location),
            progression: StageProgression::new(graph, boot.active),
            legend,
            charts,
            markers: MarkerLayer::new(mode, config.fallback_color),
            layers: config.layer_table(),
            dropdown: boot.dropdown.filter(|_| caps.dropdown),
            spinner: boot.spinner.filter(|_| caps.spinner),
            organisation: boot.organisation,
            measurement_point: boot.measurement_point,
            statistic: config.statistic.clone(),
            startpage: boot.startpage,
            locations: BTreeMap::new(),
            timeseries: None,
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_startpage(&self) -> bool {
        self.startpage
    }

    pub fn active(&self) -> Stage {
        self.view.active_view()
    }

    pub fn capabilities(&self) -> ControlCapabilities {
        self.config.capabilities(self.active())
    }

    pub fn progression(&self) -> &StageProgression {
        &self.progression
    }

    pub fn affordance(&self, stage: Stage) -> Affordance {
        self.progression.affordance(stage)
    }

    pub fn charts(&self) -> &ChartSlots {
        &self.charts
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn legend(&self) -> &LegendEditor<S> {
        &self.legend
    }

    pub fn dropdown(&self) -> Option<&Dropdown> {
        self.dropdown.as_ref()
    }

    pub fn spinner(&self) -> Option<&Spinner> {
        self.spinner.as_ref()
    }

    pub fn organisation(&self) -> &str {
        &self.organisation
    }

    pub fn measurement_point(&self) -> Option<&str> {
        self.measurement_point.as_deref()
    }

    pub fn statistic(&self) -> &str {
        &self.statistic
    }

    pub fn selected_location(&self) -> Option<&SelectedLocation> {
        self.view.selected_location()
    }

    /// Current map bounds, or the whole world before the map reported any.
    pub fn bounds(&self) -> Bounds {
        self.view
            .map_viewport()
            .map(|v| v.bounds)
            .unwrap_or_else(Bounds::world)
    }

    /// First load of the page: the location list on the start page,
    /// locations with statistics on the map stage, stage data elsewhere.
    pub fn initial_request(&mut self) -> DataRequest {
        if self.startpage {
            return self.locations_request();
        }
        match self.active() {
            Stage::Map => {
                let url = map_locations_url(&self.bounds());
                self.view.issue(Stream::Viewport, Method::Get, url, Vec::new())
            }
            stage => self
                .view
                .issue(Stream::Controls, Method::Get, stage.data_path(), Vec::new()),
        }
    }

    /// Switch tabs. Locked stages are refused.
    pub fn select_stage(&mut self, stage: Stage) -> Affordance {
        let affordance = self.progression.affordance(stage);
        if self.progression.is_unlocked(stage) {
            self.view.set_active_view(stage);
            self.markers = MarkerLayer::new(marker_mode(stage), self.config.fallback_color);
        } else {
            log::debug!("{} is still locked", stage);
        }
        affordance
    }

    pub fn on_date_change(&mut self, range: DateRange) -> Option<DataRequest> {
        if !self.capabilities().datepicker || !self.view.set_date_range(range) {
            return None;
        }
        Some(self.view.set_control_value(DATEPICKER_ID, range.picker_value()))
    }

    /// Both picker strings, as typed. Dates after `today` are clamped.
    pub fn on_picker_input(
        &mut self,
        start: &str,
        end: &str,
        today: chrono::NaiveDate,
    ) -> Result<Option<DataRequest>> {
        let range = DateRange::parse(start, end)?.clamped_to(today);
        Ok(self.on_date_change(range))
    }

    pub fn on_dropdown(&mut self, index: usize) -> Option<DataRequest> {
        let value = self.dropdown.as_mut()?.choose(index)?;
        if self.active() == Stage::Map {
            if let Some(dropdown) = &self.dropdown {
                self.statistic = dropdown.selected().trim().to_string();
            }
        }
        Some(self.view.set_control_value(DROPDOWN_ID, value))
    }

    pub fn on_spinner(&mut self, value: f64) -> Option<DataRequest> {
        let value = self.spinner.as_mut()?.set(value)?;
        Some(self.view.set_control_value(SPINNER_ID, value))
    }

    pub fn on_spinner_text(&mut self, text: &str) -> Option<DataRequest> {
        let value = self.spinner.as_mut()?.set_text(text)?;
        Some(self.view.set_control_value(SPINNER_ID, value))
    }

    pub fn on_spinner_step(&mut self, up: bool) -> Option<DataRequest> {
        let spinner = self.spinner.as_mut()?;
        let value = if up {
            spinner.increment()
        } else {
            spinner.decrement()
        }?;
        Some(self.view.set_control_value(SPINNER_ID, value))
    }

    /// A point clicked in one of the charts.
    pub fn on_graph_click(&mut self, point: serde_json::Value) -> DataRequest {
        self.view.set_control_value(GRAPH_ID, point)
    }

    /// The start page re-lists locations; every other page refetches its
    /// stage data for the new bounds. The map's first report only records
    /// where it opened.
    pub fn on_viewport(&mut self, viewport: MapViewport) -> Option<DataRequest> {
        if self.view.seed_map_viewport(viewport) {
            log::debug!("map opened at zoom {}", viewport.zoom);
            return None;
        }
        let request = self.view.set_map_viewport(viewport)?;
        if self.startpage {
            Some(self.locations_request())
        } else {
            Some(request)
        }
    }

    pub fn on_marker_click(&mut self, location_id: &str) -> MarkerClick {
        match self.markers.click_action(location_id) {
            ClickAction::Navigate { href } => MarkerClick::Navigate(href),
            ClickAction::LoadSeries { location_id } => {
                MarkerClick::Load(self.view.request_location_series(&location_id))
            }
        }
    }

    /// Bounding-box request of the start page location list.
    pub fn locations_request(&mut self) -> DataRequest {
        let params = self.bounds().corner_params();
        self.view
            .issue(Stream::Viewport, Method::Post, LOCATIONS_PATH.to_string(), params)
    }

    pub fn interpolation_request(&self) -> String {
        limits_request_url(&self.layers, &self.organisation, &self.bounds())
    }

    pub fn feature_info_request(&self, lng: f64, lat: f64) -> String {
        crate::api::feature_info_url(lng, lat, self.layers.layer_for(&self.organisation))
    }

    /// Apply a stage data response.
    pub fn apply_stage_response(
        &mut self,
        request: &DataRequest,
        delivered: Delivered<StageResponse>,
        charts: &mut impl ChartWidget,
        map: &mut impl MapWidget,
    ) -> Applied {
        if !self.view.is_current(request) {
            log::debug!(
                "dropping stale response for {} (generation {})",
                request.url,
                request.generation
            );
            return Applied::Stale;
        }
        let Delivered { body, busy } = delivered;
        let mut report = ApplyReport::default();

        if let Some(point) = body
            .graphs
            .as_ref()
            .and_then(|graphs| graphs.first())
            .and_then(|graph| graph.measurement_point.clone())
        {
            self.measurement_point = Some(point);
        }

        if let Some(result) = body.result.clone() {
            if !result.locations.is_empty() {
                self.locations = result.locations;
            }
            if let Some(timeseries) = result.timeseries {
                report.dates_changed = self.sync_dates(&timeseries);
                self.timeseries = Some(timeseries);
            }
            self.sync_extremes();
            report.markers = Some(self.redraw_markers(map));
        }

        report.charts = Some(self.charts.bind(&body, charts, busy));
        report.unlocked = self.progression.on_success(request.stage);
        Applied::Applied(report)
    }

    /// Apply the start page `/locations/` response.
    pub fn apply_locations(
        &mut self,
        request: &DataRequest,
        delivered: Delivered<LocationsResponse>,
        map: &mut impl MapWidget,
    ) -> Applied {
        if !self.view.is_current(request) {
            return Applied::Stale;
        }
        let Delivered { body, busy } = delivered;
        self.locations = body.into_locations();
        let drawn = self.redraw_markers(map);
        busy.settle();
        Applied::Applied(ApplyReport {
            markers: Some(drawn),
            ..ApplyReport::default()
        })
    }

    /// Overlay for the interpolation limits response; `None` when the
    /// response held no limits.
    pub fn apply_interpolation(
        &self,
        delivered: Delivered<InterpolationLimitsResponse>,
    ) -> Option<WmsOverlay> {
        let Delivered { body, busy } = delivered;
        let overlay = InterpolationLimits::from_response(&body)
            .map(|limits| WmsOverlay::new(self.layers.layer_for(&self.organisation), limits));
        if overlay.is_none() {
            log::warn!("interpolation limits response was empty");
        }
        busy.settle();
        overlay
    }

    /// Popup text for a feature info response.
    pub fn apply_feature_info(&self, delivered: Delivered<FeatureInfoResponse>) -> String {
        let Delivered { body, busy } = delivered;
        busy.settle();
        match body.0 {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        }
    }

    /// Rebuild every marker from the cached locations and statistics.
    pub fn redraw_markers(&mut self, map: &mut impl MapWidget) -> usize {
        let bounds = self.bounds();
        let selected = self.view.selected_location().cloned();
        self.markers
            .refresh(
                &bounds,
                &self.locations,
                self.timeseries.as_ref(),
                &self.statistic,
                self.legend.ramp(),
                selected.as_ref(),
                map,
            )
            .len()
    }

    pub fn legend_layout(&self) -> LegendLayout {
        self.legend.render(&self.config.legend_geometry())
    }

    pub fn insert_legend_stop(
        &mut self,
        after_index: usize,
        map: &mut impl MapWidget,
    ) -> Result<Option<LegendLayout>> {
        let changed = self.legend.insert_stop(after_index)?;
        Ok(self.after_legend_edit(changed, map))
    }

    pub fn remove_legend_stop(
        &mut self,
        index: usize,
        map: &mut impl MapWidget,
    ) -> Result<Option<LegendLayout>> {
        let changed = self.legend.remove_stop(index)?;
        Ok(self.after_legend_edit(changed, map))
    }

    pub fn recolor_legend_stop(
        &mut self,
        index: usize,
        color: Rgb,
        map: &mut impl MapWidget,
    ) -> Result<Option<LegendLayout>> {
        let changed = self.legend.recolor(index, color)?;
        Ok(self.after_legend_edit(changed, map))
    }

    fn after_legend_edit(&mut self, changed: bool, map: &mut impl MapWidget) -> Option<LegendLayout> {
        if !changed {
            return None;
        }
        self.redraw_markers(map);
        Some(self.legend_layout())
    }

    fn sync_extremes(&mut self) {
        if let Some(extremes) = self
            .timeseries
            .as_ref()
            .and_then(|ts| ts.extremes.get(&self.statistic))
            .filter(|extremes| extremes.is_finite())
        {
            self.legend.set_extremes(extremes.min, extremes.max);
        }
    }

    /// Take over the dates the server reports, keeping the current value for
    /// whichever end is missing or unreadable.
    fn sync_dates(&mut self, timeseries: &TimeseriesSummary) -> bool {
        let Some(hint) = &timeseries.dates else {
            return false;
        };
        let current = self.view.date_range();
        let read = |raw: &Option<String>, fallback| {
            raw.as_deref()
                .and_then(|s| parse_date(s).ok())
                .unwrap_or(fallback)
        };
        let start = read(&hint.start, current.start());
        let end = read(&hint.end, current.end());
        match DateRange::new(start, end) {
            Ok(range) => self.view.set_date_range(range),
            Err(e) => {
                log::warn!("ignoring server dates: {}", e);
                false
            }
        }
    }
}

/// Overview on the map stage, navigation everywhere else.
pub fn marker_mode(stage: Stage) -> MarkerMode {
    match stage {
        Stage::Map => MarkerMode::Overview,
        _ => MarkerMode::Navigate,
    }
}
