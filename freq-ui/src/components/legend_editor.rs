//! Editable color legend drawn as SVG.
//!
//! Clicking between two handles inserts a stop, clicking a handle opens a
//! color picker for it and double clicking a handle removes it.

use crate::js_bridge::now_ms;
use dioxus::prelude::*;
use freq_core::color::Rgb;
use freq_core::legend::{ClickArbiter, LegendLayout};
use gloo_timers::future::TimeoutFuture;

const GRADIENT_ID: &str = "freq-legend-gradient";
const AXIS_HEIGHT: f64 = 20.0;

#[derive(Props, Clone, PartialEq)]
pub struct LegendEditorProps {
    pub layout: LegendLayout,
    #[props(default = 6.0)]
    pub tick_width: f64,
    pub on_insert: EventHandler<usize>,
    pub on_remove: EventHandler<usize>,
    pub on_recolor: EventHandler<(usize, Rgb)>,
}

#[component]
pub fn LegendEditor(props: LegendEditorProps) -> Element {
    let mut arbiter = use_signal(ClickArbiter::default);
    let mut picking = use_signal(|| None::<usize>);

    let layout = props.layout.clone();
    let tick_width = props.tick_width;
    let total_height = layout.height + AXIS_HEIGHT;
    let label_y = total_height - 4.0;
    let picking_color = picking()
        .and_then(|i| layout.handles.get(i))
        .map(|h| h.color.to_hex());

    rsx! {
        div {
            id: "legend",
            style: "margin: 8px 0;",
            svg {
                width: "{layout.width}",
                height: "{total_height}",
                defs {
                    linearGradient {
                        id: GRADIENT_ID,
                        x1: "0%",
                        x2: "100%",
                        for gradient_stop in layout.stops.iter() {
                            stop {
                                offset: "{gradient_stop.offset_percent}%",
                                "stop-color": gradient_stop.color.to_hex(),
                            }
                        }
                    }
                }
                rect {
                    x: "0",
                    y: "0",
                    width: "{layout.width}",
                    height: "{layout.height}",
                    fill: "url(#{GRADIENT_ID})",
                }
                for region in layout.regions.iter().cloned() {
                    rect {
                        key: "region-{region.after_index}",
                        x: "{region.x}",
                        y: "0",
                        width: "{region.width}",
                        height: "{layout.height}",
                        fill: "transparent",
                        style: "cursor: copy;",
                        onclick: move |_| props.on_insert.call(region.after_index),
                    }
                }
                for (left, handle) in layout.handles.iter().cloned().map(|h| (h.x - tick_width / 2.0, h)) {
                    rect {
                        key: "handle-{handle.index}",
                        x: "{left}",
                        y: "0",
                        width: "{tick_width}",
                        height: "{layout.height}",
                        fill: handle.color.to_hex(),
                        stroke: "#000",
                        style: "cursor: pointer;",
                        onclick: move |_| {
                            let index = handle.index;
                            spawn(async move {
                                TimeoutFuture::new(ClickArbiter::CLICK_DELAY_MS).await;
                                if arbiter.read().should_open_picker(now_ms()) {
                                    picking.set(Some(index));
                                }
                            });
                        },
                        ondoubleclick: move |_| {
                            arbiter.write().on_double_click(now_ms());
                            picking.set(None);
                            props.on_remove.call(handle.index);
                        },
                    }
                }
                for tick in layout.ticks.iter() {
                    text {
                        x: "{tick.x}",
                        y: "{label_y}",
                        "text-anchor": "middle",
                        "font-size": "10",
                        "{tick.label}"
                    }
                }
            }
            if let (Some(index), Some(color)) = (picking(), picking_color) {
                input {
                    r#type: "color",
                    value: "{color}",
                    onchange: move |evt: Event<FormData>| {
                        picking.set(None);
                        match evt.value().parse::<Rgb>() {
                            Ok(rgb) => props.on_recolor.call((index, rgb)),
                            Err(e) => log::warn!("ignoring picked color: {}", e),
                        }
                    },
                }
            }
        }
    }
}
