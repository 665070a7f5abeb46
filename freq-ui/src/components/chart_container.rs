//! The two chart slots D3 renders into.

use crate::widgets::slot_wrapper_id;
use dioxus::prelude::*;
use freq_core::chart::SLOT_COUNT;

#[derive(Props, Clone, PartialEq)]
pub struct ChartContainerProps {
    /// Whether the first response is still outstanding
    #[props(default = false)]
    pub loading: bool,
    #[props(default = 300)]
    pub min_height: u32,
}

/// Both slots start hidden; binding a response reveals them.
#[component]
pub fn ChartContainer(props: ChartContainerProps) -> Element {
    let style = format!(
        "min-height: {}px; position: relative; width: 100%;",
        props.min_height
    );

    rsx! {
        div {
            style: "{style}",
            if props.loading {
                div {
                    style: "position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); color: #666;",
                    "Loading chart..."
                }
            }
            for slot in 0..SLOT_COUNT {
                div {
                    key: "{slot}",
                    id: slot_wrapper_id(slot),
                    style: "display: none; width: 100%; margin-bottom: 12px;",
                    div {
                        id: "chart_{slot}",
                        style: "width: 100%;",
                    }
                }
            }
        }
    }
}
