//! Dropdown selector: the chosen entry on top, the remaining options below.

use crate::state::AppState;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct DropdownSelectorProps {
    /// Called with the index of the clicked option
    pub on_choose: EventHandler<usize>,
}

#[component]
pub fn DropdownSelector(props: DropdownSelectorProps) -> Element {
    let state = use_context::<AppState>();
    let mut open = use_signal(|| false);
    let Some(dropdown) = state.dropdown.read().clone() else {
        return rsx! {};
    };

    rsx! {
        div {
            style: "margin: 8px 0; position: relative;",
            title: "{dropdown.title}",
            if !dropdown.heading.is_empty() {
                label {
                    style: "font-weight: bold; margin-right: 8px;",
                    "{dropdown.heading}"
                }
            }
            button {
                id: "dropdown-selected",
                onclick: move |_| open.toggle(),
                "{dropdown.selected}"
            }
            if open() {
                ul {
                    style: "list-style: none; margin: 0; padding: 4px 0; position: absolute; background: #fff; border: 1px solid #ccc; z-index: 10;",
                    for (index, option) in dropdown.options.iter().enumerate() {
                        li {
                            key: "{index}",
                            id: "dropdown-option-{index}",
                            style: "padding: 2px 12px; cursor: pointer;",
                            onclick: move |_| {
                                open.set(false);
                                props.on_choose.call(index);
                            },
                            "{option}"
                        }
                    }
                }
            }
        }
    }
}
