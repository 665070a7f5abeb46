//! Stage navigation tabs; locked stages render disabled.

use crate::state::AppState;
use dioxus::prelude::*;
use freq_core::stage::Stage;

#[derive(Props, Clone, PartialEq)]
pub struct StageTabsProps {
    pub on_select: EventHandler<Stage>,
}

#[component]
pub fn StageTabs(props: StageTabsProps) -> Element {
    let state = use_context::<AppState>();
    let tabs = state.tabs.read().clone();

    rsx! {
        nav {
            style: "display: flex; gap: 4px; border-bottom: 1px solid #ddd; margin-bottom: 8px;",
            for tab in tabs {
                {
                    let stage = tab.stage;
                    let title = stage.title();
                    let enabled = tab.affordance.enabled;
                    let href = tab.affordance.href.unwrap_or_else(|| "#".to_string());
                    let class = if enabled { "" } else { "disabled" };
                    let style = match (tab.active, enabled) {
                        (true, _) => "padding: 6px 10px; font-weight: bold; border-bottom: 2px solid #3498db;",
                        (false, true) => "padding: 6px 10px; cursor: pointer; color: #3498db;",
                        (false, false) => "padding: 6px 10px; color: #bbb; cursor: not-allowed;",
                    };
                    rsx! {
                        a {
                            key: "{stage}",
                            id: "{stage}",
                            class: "{class}",
                            style: "{style}",
                            href: "{href}",
                            onclick: move |evt| {
                                if !enabled {
                                    evt.prevent_default();
                                    return;
                                }
                                props.on_select.call(stage);
                            },
                            "{title}"
                        }
                    }
                }
            }
        }
    }
}
