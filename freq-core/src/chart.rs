//! Binding of stage responses onto the two chart slots.

use crate::api::StageResponse;
use crate::gateway::BusyToken;

/// Number of chart slots on every stage page.
pub const SLOT_COUNT: usize = 2;

/// The charting widget, as far as binding needs it.
pub trait ChartWidget {
    fn set_visible(&mut self, slot: usize, visible: bool);
    /// Rendered `(width, height)` in pixels, if the slot has been laid out.
    fn rendered_size(&self, slot: usize) -> Option<(f64, f64)>;
    fn set_size(&mut self, slot: usize, width: f64, height: f64);
    fn set_y_label(&mut self, slot: usize, label: &str);
    fn render(&mut self, slot: usize, target: &str, series_name: &str, data: &serde_json::Value);
    /// Show `text` in statistics display `index`, or hide it on `None`.
    fn set_statistic(&mut self, index: usize, text: Option<&str>);
}

/// Y-axis label for slot `index` given the current reference.
pub type LabelFn = fn(usize, &str) -> String;

pub fn default_y_label(index: usize, reference: &str) -> String {
    let quantity = match index {
        0 => "Groundwater level",
        _ => "Residual",
    };
    if reference.is_empty() {
        quantity.to_string()
    } else {
        format!("{quantity} ({reference})")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// No graphs in the payload; charts left untouched.
    Skipped,
    Bound { graphs: usize },
}

#[derive(Debug, Clone)]
pub struct ChartSlots {
    targets: [String; SLOT_COUNT],
    label: LabelFn,
    statistic_slots: usize,
    reference: String,
    visible: [bool; SLOT_COUNT],
}

impl ChartSlots {
    pub fn new(targets: [String; SLOT_COUNT], label: LabelFn, statistic_slots: usize) -> Self {
        Self {
            targets,
            label,
            statistic_slots,
            reference: String::new(),
            visible: [false; SLOT_COUNT],
        }
    }

    /// Slots targeting `#chart_0` and `#chart_1`.
    pub fn standard(statistic_slots: usize) -> Self {
        Self::new(
            ["chart_0".to_string(), "chart_1".to_string()],
            default_y_label,
            statistic_slots,
        )
    }

    pub fn target(&self, slot: usize) -> &str {
        &self.targets[slot]
    }

    pub fn is_visible(&self, slot: usize) -> bool {
        self.visible.get(slot).copied().unwrap_or(false)
    }

    pub fn set_reference(&mut self, reference: &str) {
        self.reference = reference.to_string();
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Apply `payload` to the widget. `busy` is settled exactly once, whether
    /// or not anything was bound.
    pub fn bind(
        &mut self,
        payload: &StageResponse,
        widget: &mut impl ChartWidget,
        busy: BusyToken,
    ) -> BindOutcome {
        if let Some(statistics) = &payload.statistics {
            for index in 0..self.statistic_slots.max(statistics.len()) {
                widget.set_statistic(index, statistics.get(index).map(String::as_str));
            }
        }

        let outcome = match payload.graphs.as_deref() {
            None | Some([]) => {
                log::debug!("response without graphs, charts unchanged");
                BindOutcome::Skipped
            }
            Some(graphs) => {
                if graphs.len() > SLOT_COUNT {
                    log::warn!(
                        "{} graphs returned, only {} slots available",
                        graphs.len(),
                        SLOT_COUNT
                    );
                }
                let shown = graphs.len().min(SLOT_COUNT);
                for slot in 0..SLOT_COUNT {
                    let visible = slot < shown;
                    widget.set_visible(slot, visible);
                    self.visible[slot] = visible;
                }
                // Slot 0 only has a size once it is shown and drawn.
                for (slot, graph) in graphs.iter().take(shown).enumerate() {
                    if slot == 1 {
                        if let Some((width, height)) = widget.rendered_size(0) {
                            widget.set_size(1, width, height);
                        }
                    }
                    widget.set_y_label(slot, &(self.label)(slot, &self.reference));
                    widget.render(slot, &self.targets[slot], &graph.name, &graph.data);
                }
                BindOutcome::Bound { graphs: shown }
            }
        };

        busy.settle();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{BusyCounter, BusyIndicator};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeCharts {
        visible: [Option<bool>; 2],
        sizes: [Option<(f64, f64)>; 2],
        labels: Vec<(usize, String)>,
        rendered: Vec<(usize, String)>,
        statistics: Vec<(usize, Option<String>)>,
        second_sized_first: Option<bool>,
    }

    impl ChartWidget for FakeCharts {
        fn set_visible(&mut self, slot: usize, visible: bool) {
            self.visible[slot] = Some(visible);
        }
        fn rendered_size(&self, slot: usize) -> Option<(f64, f64)> {
            // Like the DOM: a hidden or empty slot has no size.
            let drawn = self.rendered.iter().any(|(s, _)| *s == slot);
            (slot == 0 && self.visible[slot] == Some(true) && drawn).then_some((640.0, 300.0))
        }
        fn set_size(&mut self, slot: usize, width: f64, height: f64) {
            self.sizes[slot] = Some((width, height));
        }
        fn set_y_label(&mut self, slot: usize, label: &str) {
            self.labels.push((slot, label.to_string()));
        }
        fn render(&mut self, slot: usize, target: &str, _series: &str, _data: &serde_json::Value) {
            if slot == 1 {
                self.second_sized_first = Some(self.sizes[1].is_some());
            }
            self.rendered.push((slot, target.to_string()));
        }
        fn set_statistic(&mut self, index: usize, text: Option<&str>) {
            self.statistics.push((index, text.map(str::to_string)));
        }
    }

    struct CountingIndicator(Cell<usize>);

    impl BusyIndicator for CountingIndicator {
        fn show(&self) {}
        fn hide(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn payload(json: &str) -> StageResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_two_graphs_reveal_both_and_sync_size() {
        let mut slots = ChartSlots::standard(3);
        slots.set_reference("m MSL");
        let mut charts = FakeCharts::default();
        let outcome = slots.bind(
            &payload(r#"{"graphs":[{"name":"a","data":[]},{"name":"b","data":[]}]}"#),
            &mut charts,
            BusyToken::detached(),
        );
        assert_eq!(outcome, BindOutcome::Bound { graphs: 2 });
        assert_eq!(charts.visible, [Some(true), Some(true)]);
        assert_eq!(charts.sizes[1], Some((640.0, 300.0)));
        assert_eq!(charts.second_sized_first, Some(true));
        assert_eq!(charts.labels[0], (0, "Groundwater level (m MSL)".to_string()));
        assert_eq!(charts.labels[1], (1, "Residual (m MSL)".to_string()));
        assert_eq!(charts.rendered, vec![(0, "chart_0".to_string()), (1, "chart_1".to_string())]);
    }

    #[test]
    fn test_one_graph_reveals_only_first() {
        let mut slots = ChartSlots::standard(0);
        let mut charts = FakeCharts::default();
        slots.bind(
            &payload(r#"{"graphs":[{"name":"a","data":[1]}]}"#),
            &mut charts,
            BusyToken::detached(),
        );
        assert_eq!(charts.visible, [Some(true), Some(false)]);
        assert!(charts.sizes[1].is_none());
        assert!(slots.is_visible(0));
        assert!(!slots.is_visible(1));
    }

    #[test]
    fn test_first_bind_sizes_second_slot_from_hidden_start() {
        let mut slots = ChartSlots::standard(0);
        let mut charts = FakeCharts::default();
        assert!(charts.rendered_size(0).is_none());
        slots.bind(
            &payload(r#"{"graphs":[{"name":"a","data":[1]},{"name":"b","data":[2]}]}"#),
            &mut charts,
            BusyToken::detached(),
        );
        assert_eq!(charts.sizes[1], Some((640.0, 300.0)));
        assert_eq!(charts.rendered.len(), 2);
    }

    #[test]
    fn test_missing_graphs_change_nothing() {
        let mut slots = ChartSlots::standard(2);
        let mut charts = FakeCharts::default();
        for body in ["{}", r#"{"graphs":[]}"#] {
            let outcome = slots.bind(&payload(body), &mut charts, BusyToken::detached());
            assert_eq!(outcome, BindOutcome::Skipped);
        }
        assert_eq!(charts.visible, [None, None]);
        assert!(charts.rendered.is_empty());
        assert!(charts.statistics.is_empty());
    }

    #[test]
    fn test_statistics_reveal_and_hide() {
        let mut slots = ChartSlots::standard(3);
        let mut charts = FakeCharts::default();
        slots.bind(
            &payload(r#"{"statistics":["trend: none","p=0.4"]}"#),
            &mut charts,
            BusyToken::detached(),
        );
        assert_eq!(
            charts.statistics,
            vec![
                (0, Some("trend: none".to_string())),
                (1, Some("p=0.4".to_string())),
                (2, None),
            ]
        );
    }

    #[test]
    fn test_busy_cleared_once_per_bind() {
        let indicator = Rc::new(CountingIndicator(Cell::new(0)));
        let counter = BusyCounter::new(indicator.clone());
        let mut slots = ChartSlots::standard(0);
        let mut charts = FakeCharts::default();
        slots.bind(&payload("{}"), &mut charts, counter.begin());
        assert_eq!(indicator.0.get(), 1);
        assert_eq!(counter.count(), 0);
        slots.bind(
            &payload(r#"{"graphs":[{"name":"a"}]}"#),
            &mut charts,
            counter.begin(),
        );
        assert_eq!(indicator.0.get(), 2);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_extra_graphs_are_ignored() {
        let mut slots = ChartSlots::standard(0);
        let mut charts = FakeCharts::default();
        let outcome = slots.bind(
            &payload(r#"{"graphs":[{"name":"a"},{"name":"b"},{"name":"c"}]}"#),
            &mut charts,
            BusyToken::detached(),
        );
        assert_eq!(outcome, BindOutcome::Bound { graphs: 2 });
        assert_eq!(charts.rendered.len(), 2);
    }
}
