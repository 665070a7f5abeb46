//! Start and end date inputs in `dd-mm-yyyy`.

use crate::state::AppState;
use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct DateRangePickerProps {
    /// Called with `(start, end)` whenever either input changes
    pub on_change: EventHandler<(String, String)>,
}

#[component]
pub fn DateRangePicker(props: DateRangePickerProps) -> Element {
    let mut state = use_context::<AppState>();
    let start = (state.start_date)();
    let end = (state.end_date)();

    let on_start_change = move |evt: Event<FormData>| {
        let value = evt.value();
        state.start_date.set(value.clone());
        props.on_change.call((value, (state.end_date)()));
    };

    let on_end_change = move |evt: Event<FormData>| {
        let value = evt.value();
        state.end_date.set(value.clone());
        props.on_change.call(((state.start_date)(), value));
    };

    rsx! {
        div {
            class: "input-daterange",
            style: "margin: 8px 0; display: flex; gap: 12px; align-items: center;",
            label {
                style: "font-weight: bold;",
                "From: "
                input {
                    id: "date_picker_start",
                    r#type: "text",
                    placeholder: "dd-mm-yyyy",
                    size: "10",
                    value: "{start}",
                    onchange: on_start_change,
                }
            }
            label {
                style: "font-weight: bold;",
                "To: "
                input {
                    id: "date_picker_end",
                    r#type: "text",
                    placeholder: "dd-mm-yyyy",
                    size: "10",
                    value: "{end}",
                    onchange: on_end_change,
                }
            }
        }
    }
}
