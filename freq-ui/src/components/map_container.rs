//! Leaflet map container.

use crate::js_bridge;
use dioxus::prelude::*;

pub const MAP_ELEMENT_ID: &str = "map";

#[derive(Props, Clone, PartialEq)]
pub struct MapContainerProps {
    #[props(default = 52.0)]
    pub lat: f64,
    #[props(default = 5.0)]
    pub lng: f64,
    #[props(default = 3)]
    pub zoom: u8,
    #[props(default = 420)]
    pub height: u32,
}

#[component]
pub fn MapContainer(props: MapContainerProps) -> Element {
    let (lat, lng, zoom) = (props.lat, props.lng, props.zoom);
    use_effect(move || {
        js_bridge::init_map(MAP_ELEMENT_ID, lat, lng, zoom);
    });

    rsx! {
        div {
            id: MAP_ELEMENT_ID,
            style: "width: 100%; height: {props.height}px; border: 1px solid #ccc; border-radius: 4px;",
        }
    }
}
