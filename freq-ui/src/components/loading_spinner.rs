//! Busy indicator shown while any request is outstanding.

use crate::state::AppState;
use dioxus::prelude::*;

#[component]
pub fn LoadingSpinner() -> Element {
    let state = use_context::<AppState>();
    if !(state.busy)() {
        return rsx! {};
    }
    rsx! {
        div {
            id: "spinner-overlay",
            style: "position: fixed; top: 12px; right: 12px; padding: 6px 12px; background: #fff; border: 1px solid #ccc; border-radius: 4px; color: #666; z-index: 1000;",
            "Loading data..."
        }
    }
}
