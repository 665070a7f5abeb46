//! Text slots for the per-response statistics.

use crate::widgets::statistic_id;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct StatisticsPanelProps {
    pub count: usize,
}

/// Filled in directly by chart binding; all slots start hidden.
#[component]
pub fn StatisticsPanel(props: StatisticsPanelProps) -> Element {
    rsx! {
        div {
            style: "font-size: 12px; color: #444; margin: 4px 0;",
            for index in 0..props.count {
                p {
                    key: "{index}",
                    id: statistic_id(index),
                    style: "display: none; margin: 2px 0;",
                }
            }
        }
    }
}
