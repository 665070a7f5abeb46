//! Numeric spinner control.

use crate::state::AppState;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct SpinnerInputProps {
    /// Raw text typed into the input
    pub on_input: EventHandler<String>,
    /// `true` for one step up, `false` for one step down
    pub on_step: EventHandler<bool>,
}

#[component]
pub fn SpinnerInput(props: SpinnerInputProps) -> Element {
    let state = use_context::<AppState>();
    let Some(spinner) = state.spinner.read().clone() else {
        return rsx! {};
    };
    let value = format!("{:.*}", spinner.precision as usize, spinner.value);
    let id = spinner.id();

    rsx! {
        div {
            style: "margin: 8px 0; display: flex; gap: 6px; align-items: center;",
            title: "{spinner.title}",
            if !spinner.heading.is_empty() {
                label {
                    r#for: "{id}",
                    style: "font-weight: bold;",
                    "{spinner.heading}"
                }
            }
            button { onclick: move |_| props.on_step.call(false), "-" }
            input {
                id: "{id}",
                r#type: "number",
                value: "{value}",
                step: "{spinner.step}",
                min: "{spinner.min}",
                style: "width: 80px;",
                onchange: move |evt: Event<FormData>| props.on_input.call(evt.value()),
            }
            button { onclick: move |_| props.on_step.call(true), "+" }
        }
    }
}
