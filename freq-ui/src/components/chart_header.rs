//! Page header: stage title, organisation and measurement point.

use crate::state::AppState;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct ChartHeaderProps {
    pub title: String,
}

#[component]
pub fn ChartHeader(props: ChartHeaderProps) -> Element {
    let state = use_context::<AppState>();
    let point = state
        .measurement_point
        .read()
        .clone()
        .unwrap_or_else(|| "No Time Series Selected".to_string());
    let organisation = (state.organisation)();

    rsx! {
        div {
            style: "margin-bottom: 8px;",
            h3 {
                style: "margin: 0 0 4px 0; font-size: 16px;",
                "{props.title}"
            }
            p {
                style: "margin: 0; font-size: 12px; color: #666;",
                "{point}"
                if !organisation.is_empty() {
                    span { class: "organisation", " ({organisation})" }
                }
            }
        }
    }
}
