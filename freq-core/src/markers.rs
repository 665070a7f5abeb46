//! Point markers colored by a statistic, rebuilt wholesale on every refresh.

use crate::api::{Location, TimeseriesSummary};
use crate::color::{ColorScale, Rgb};
use crate::legend::{format_tick, LegendRamp};
use crate::view_state::SelectedLocation;
use crate::viewport::Bounds;
use serde::Serialize;
use std::collections::BTreeMap;

/// What clicking a marker does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMode {
    /// Go to the location's detail page.
    Navigate,
    /// Stay on the map and load the location's series into the charts.
    Overview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickAction {
    Navigate { href: String },
    LoadSeries { location_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub location_id: String,
    pub name: String,
    /// `(lon, lat)`
    pub coordinates: (f64, f64),
    pub statistic_value: f64,
    pub label: String,
    pub color: Rgb,
    pub highlighted: bool,
    pub on_click: ClickAction,
}

/// The mapping widget, as far as markers need it.
pub trait MapWidget {
    fn clear_markers(&mut self);
    fn add_marker(&mut self, marker: &Marker);
}

#[derive(Debug, Clone)]
pub struct MarkerLayer {
    mode: MarkerMode,
    fallback: Rgb,
    markers: Vec<Marker>,
}

impl MarkerLayer {
    pub fn new(mode: MarkerMode, fallback: Rgb) -> Self {
        Self {
            mode,
            fallback,
            markers: Vec::new(),
        }
    }

    pub fn mode(&self) -> MarkerMode {
        self.mode
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn click_action(&self, location_id: &str) -> ClickAction {
        match self.mode {
            MarkerMode::Navigate => ClickAction::Navigate {
                href: format!("/timeseries/{}", location_id),
            },
            MarkerMode::Overview => ClickAction::LoadSeries {
                location_id: location_id.to_string(),
            },
        }
    }

    /// Replace every marker with one per location inside `bounds`.
    ///
    /// Values are colored through `ramp` over the statistic's extremes. NaN,
    /// missing values, and statistics without finite extremes get the
    /// fallback color; the scale itself never sees NaN.
    #[allow(clippy::too_many_arguments)]
    pub fn refresh(
        &mut self,
        bounds: &Bounds,
        locations: &BTreeMap<String, Location>,
        timeseries: Option<&TimeseriesSummary>,
        statistic: &str,
        ramp: &LegendRamp,
        selected: Option<&SelectedLocation>,
        widget: &mut impl MapWidget,
    ) -> &[Marker] {
        widget.clear_markers();

        let scale: Option<ColorScale> = timeseries
            .and_then(|ts| ts.extremes.get(statistic))
            .filter(|extremes| extremes.is_finite())
            .map(|extremes| ramp.scale(extremes.min, extremes.max));

        let highlight = match self.mode {
            MarkerMode::Navigate => selected,
            MarkerMode::Overview => None,
        };

        let mut markers: Vec<Marker> = locations
            .iter()
            .filter(|(_, location)| bounds.contains(location.coordinates.0, location.coordinates.1))
            .map(|(id, location)| {
                let value = timeseries
                    .map(|ts| ts.value(id, statistic))
                    .unwrap_or(f64::NAN);
                let color = match (&scale, value.is_nan()) {
                    (Some(scale), false) => scale.color_for(value).unwrap_or(self.fallback),
                    _ => self.fallback,
                };
                Marker {
                    location_id: id.clone(),
                    name: location.name.clone(),
                    coordinates: location.coordinates,
                    statistic_value: value,
                    label: value_label(value),
                    color,
                    highlighted: highlight.is_some_and(|s| &s.uuid == id),
                    on_click: self.click_action(id),
                }
            })
            .collect();

        if let Some(selected) = highlight {
            if !markers.iter().any(|m| m.highlighted) {
                markers.push(Marker {
                    location_id: selected.uuid.clone(),
                    name: String::new(),
                    coordinates: (selected.x, selected.y),
                    statistic_value: f64::NAN,
                    label: value_label(f64::NAN),
                    color: self.fallback,
                    highlighted: true,
                    on_click: self.click_action(&selected.uuid),
                });
            }
        }

        for marker in &markers {
            widget.add_marker(marker);
        }
        log::debug!("drew {} markers", markers.len());
        self.markers = markers;
        &self.markers
    }
}

/// Popup text for a statistic value; `-` when unavailable.
pub fn value_label(value: f64) -> String {
    if value.is_finite() {
        format_tick(value)
    } else {
        "-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeMap {
        cleared: usize,
        added: Vec<Marker>,
    }

    impl MapWidget for FakeMap {
        fn clear_markers(&mut self) {
            self.cleared += 1;
            self.added.clear();
        }
        fn add_marker(&mut self, marker: &Marker) {
            self.added.push(marker.clone());
        }
    }

    const FALLBACK: Rgb = Rgb::new(0x88, 0x88, 0x88);

    fn fixture() -> (BTreeMap<String, Location>, TimeseriesSummary) {
        let locations = serde_json::from_str(
            r#"{
                "a": {"coordinates": [5.0, 52.0], "name": "A"},
                "b": {"coordinates": [6.0, 52.5], "name": "B"},
                "c": {"coordinates": [6.5, 53.0], "name": "C"},
                "far": {"coordinates": [120.0, -30.0], "name": "Far"}
            }"#,
        )
        .unwrap();
        let timeseries = serde_json::from_str(
            r#"{
                "extremes": {"mean": {"min": 0.5, "max": 2.5}},
                "values": {"a": {"mean": 0.5}, "b": {"mean": "NaN"}, "c": {"max": 4.0}}
            }"#,
        )
        .unwrap();
        (locations, timeseries)
    }

    fn bounds() -> Bounds {
        Bounds::new(50.0, 3.0, 54.0, 8.0)
    }

    #[test]
    fn test_colors_and_fallbacks() {
        let (locations, ts) = fixture();
        let mut layer = MarkerLayer::new(MarkerMode::Overview, FALLBACK);
        let mut map = FakeMap::default();
        let ramp = LegendRamp::default_ramp();
        let markers = layer.refresh(&bounds(), &locations, Some(&ts), "mean", &ramp, None, &mut map);
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].color, ramp.colors()[0]);
        assert_eq!(markers[0].label, "0.5");
        assert_eq!(markers[1].color, FALLBACK);
        assert_eq!(markers[1].label, "-");
        assert_eq!(markers[2].color, FALLBACK);
        assert_eq!(map.cleared, 1);
        assert_eq!(map.added.len(), 3);
    }

    #[test]
    fn test_absent_statistic_uses_fallback() {
        let (locations, ts) = fixture();
        let mut layer = MarkerLayer::new(MarkerMode::Overview, FALLBACK);
        let mut map = FakeMap::default();
        let markers = layer.refresh(
            &bounds(),
            &locations,
            Some(&ts),
            "median",
            &LegendRamp::default_ramp(),
            None,
            &mut map,
        );
        assert!(markers.iter().all(|m| m.color == FALLBACK));
    }

    #[test]
    fn test_refresh_replaces_previous_markers() {
        let (locations, ts) = fixture();
        let mut layer = MarkerLayer::new(MarkerMode::Overview, FALLBACK);
        let mut map = FakeMap::default();
        let ramp = LegendRamp::default_ramp();
        layer.refresh(&bounds(), &locations, Some(&ts), "mean", &ramp, None, &mut map);
        let small = Bounds::new(51.0, 4.0, 52.1, 5.5);
        layer.refresh(&small, &locations, Some(&ts), "mean", &ramp, None, &mut map);
        assert_eq!(map.cleared, 2);
        assert_eq!(map.added.len(), 1);
        assert_eq!(layer.markers()[0].location_id, "a");
    }

    #[test]
    fn test_overview_click_loads_series_without_highlight() {
        let (locations, ts) = fixture();
        let selected = SelectedLocation { uuid: "a".to_string(), x: 5.0, y: 52.0 };
        let mut layer = MarkerLayer::new(MarkerMode::Overview, FALLBACK);
        let mut map = FakeMap::default();
        let markers = layer.refresh(
            &bounds(),
            &locations,
            Some(&ts),
            "mean",
            &LegendRamp::default_ramp(),
            Some(&selected),
            &mut map,
        );
        assert!(markers.iter().all(|m| !m.highlighted));
        assert_eq!(
            markers[0].on_click,
            ClickAction::LoadSeries { location_id: "a".to_string() }
        );
    }

    #[test]
    fn test_navigate_mode_highlights_exactly_one() {
        let (locations, ts) = fixture();
        let selected = SelectedLocation { uuid: "b".to_string(), x: 6.0, y: 52.5 };
        let mut layer = MarkerLayer::new(MarkerMode::Navigate, FALLBACK);
        let mut map = FakeMap::default();
        let markers = layer.refresh(
            &bounds(),
            &locations,
            Some(&ts),
            "mean",
            &LegendRamp::default_ramp(),
            Some(&selected),
            &mut map,
        );
        assert_eq!(markers.iter().filter(|m| m.highlighted).count(), 1);
        assert_eq!(
            markers[0].on_click,
            ClickAction::Navigate { href: "/timeseries/a".to_string() }
        );
    }

    #[test]
    fn test_selected_outside_results_still_drawn() {
        let (locations, _) = fixture();
        let selected = SelectedLocation { uuid: "zz".to_string(), x: 4.0, y: 51.0 };
        let mut layer = MarkerLayer::new(MarkerMode::Navigate, FALLBACK);
        let mut map = FakeMap::default();
        let markers = layer.refresh(
            &bounds(),
            &locations,
            None,
            "mean",
            &LegendRamp::default_ramp(),
            Some(&selected),
            &mut map,
        );
        assert_eq!(markers.len(), 4);
        assert!(markers.last().unwrap().highlighted);
        assert_eq!(markers.iter().filter(|m| m.highlighted).count(), 1);
    }
}
