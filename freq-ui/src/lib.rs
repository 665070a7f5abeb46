//! Dioxus components and the D3/Leaflet bridge for the FREQ dashboard.
//!
//! - `js_bridge`: wrappers for the chart and map scripts via `js_sys::eval()`
//! - `widgets`: browser implementations of the chart and map widget traits
//! - `transport`, `storage`: `reqwest` transport and `localStorage` ramp store
//! - `state`: reactive AppState with Dioxus Signals
//! - `components`: reusable RSX components

pub mod components;
pub mod js_bridge;
pub mod state;
pub mod storage;
pub mod transport;
pub mod widgets;
