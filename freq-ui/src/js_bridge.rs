//! Typed wrappers around JS interop via `js_sys::eval()`.
//!
//! The D3 chart and Leaflet map helpers live in `assets/js/*.js`. They are
//! evaluated at global scope once both libraries have loaded and exposed as
//! `window.*` functions. Calls made before that poll until ready.

use serde::Deserialize;
use wasm_bindgen::JsCast;

static CHARTS_JS: &str = include_str!("../assets/js/freq-charts.js");
static MAP_JS: &str = include_str!("../assets/js/freq-map.js");

/// Execute arbitrary JS, wrapping in try/catch to avoid panics.
pub fn call_js(code: &str) {
    let wrapped = format!(
        "try {{ {} }} catch(e) {{ console.warn('FREQ JS call failed:', e); }}",
        code
    );
    let _ = js_sys::eval(&wrapped);
}

/// Quote `s` as a JS string literal.
pub fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "''".to_string())
}

/// Evaluate the chart and map scripts once D3 and Leaflet are available.
pub fn init_scripts() {
    let all_js = [CHARTS_JS, MAP_JS].join("\n");
    let store_js = format!("window.__freqScripts = {};", js_string(&all_js));
    let _ = js_sys::eval(&store_js);

    let init_js = r#"
        (function() {
            var waitForLibs = setInterval(function() {
                if (typeof d3 !== 'undefined' && typeof L !== 'undefined') {
                    clearInterval(waitForLibs);
                    (0, eval)(window.__freqScripts);
                    delete window.__freqScripts;
                    window.renderFreqChart = renderFreqChart;
                    window.initFreqMap = initFreqMap;
                    window.freqClearMarkers = freqClearMarkers;
                    window.freqAddMarker = freqAddMarker;
                    window.freqSetOverlay = freqSetOverlay;
                    window.freqShowPopup = freqShowPopup;
                    window.__freqEvents = window.__freqEvents || [];
                    window.__freqReady = true;
                    console.log('FREQ scripts initialized');
                }
            }, 100);
        })();
    "#;
    let _ = js_sys::eval(init_js);
}

/// Run `call` once the scripts are ready and, if given, element `wait_for`
/// exists.
fn when_ready(wait_for: Option<&str>, call: &str) {
    let dom_check = wait_for
        .map(|id| format!(" && document.getElementById({})", js_string(id)))
        .unwrap_or_default();
    call_js(&format!(
        r#"
        (function() {{
            if (window.__freqReady{dom_check}) {{
                try {{ {call} }} catch(e) {{ console.error('[FREQ]', e); }}
                return;
            }}
            var poll = setInterval(function() {{
                if (window.__freqReady{dom_check}) {{
                    clearInterval(poll);
                    try {{ {call} }} catch(e) {{ console.error('[FREQ]', e); }}
                }}
            }}, 100);
        }})();
        "#,
    ));
}

/// Render one chart slot.
pub fn render_chart(container_id: &str, series_name: &str, data_json: &str, config_json: &str) {
    when_ready(
        Some(container_id),
        &format!(
            "window.renderFreqChart({}, {}, {}, {});",
            js_string(container_id),
            js_string(series_name),
            js_string(data_json),
            js_string(config_json)
        ),
    );
}

pub fn init_map(container_id: &str, lat: f64, lng: f64, zoom: u8) {
    when_ready(
        Some(container_id),
        &format!(
            "window.initFreqMap({}, {}, {}, {});",
            js_string(container_id),
            lat,
            lng,
            zoom
        ),
    );
}

pub fn clear_markers() {
    when_ready(None, "window.freqClearMarkers();");
}

pub fn add_marker(marker_json: &str) {
    when_ready(None, &format!("window.freqAddMarker({});", js_string(marker_json)));
}

pub fn set_overlay(overlay_json: &str) {
    when_ready(None, &format!("window.freqSetOverlay({});", js_string(overlay_json)));
}

pub fn show_popup(lat: f64, lng: f64, text: &str) {
    when_ready(
        None,
        &format!("window.freqShowPopup({}, {}, {});", lat, lng, js_string(text)),
    );
}

/// Something the user did inside a JS-owned widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BridgeEvent {
    Viewport {
        bounds: freq_core::viewport::Bounds,
        zoom: u8,
    },
    Marker {
        location_id: String,
    },
    MapClick {
        lat: f64,
        lng: f64,
    },
    GraphPoint {
        point: serde_json::Value,
    },
}

/// Decode a drained event batch; unknown entries are skipped.
pub fn parse_events(json: &str) -> Vec<BridgeEvent> {
    let raw: Vec<serde_json::Value> = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("unreadable event batch: {}", e);
            return Vec::new();
        }
    };
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(event) => Some(event),
            Err(e) => {
                log::debug!("skipping bridge event: {}", e);
                None
            }
        })
        .collect()
}

/// Take every queued event out of `window.__freqEvents`.
pub fn drain_events() -> Vec<BridgeEvent> {
    let json = js_sys::eval("JSON.stringify((window.__freqEvents || []).splice(0))")
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default();
    if json.is_empty() || json == "[]" {
        return Vec::new();
    }
    parse_events(&json)
}

fn element(id: &str) -> Option<web_sys::Element> {
    web_sys::window()?.document()?.get_element_by_id(id)
}

/// Text content of element `id`, e.g. the server's bootstrap `<script>`.
pub fn element_text(id: &str) -> Option<String> {
    element(id)?.text_content()
}

pub fn set_display(id: &str, visible: bool) {
    if let Some(el) = element(id).and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok()) {
        let value = if visible { "" } else { "none" };
        let _ = el.style().set_property("display", value);
    }
}

pub fn set_size(id: &str, width: f64, height: f64) {
    if let Some(el) = element(id).and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok()) {
        let style = el.style();
        let _ = style.set_property("width", &format!("{width}px"));
        let _ = style.set_property("height", &format!("{height}px"));
    }
}

/// Laid-out `(width, height)` of element `id`; `None` before layout.
pub fn rendered_size(id: &str) -> Option<(f64, f64)> {
    let rect = element(id)?.get_bounding_client_rect();
    (rect.width() > 0.0 && rect.height() > 0.0).then(|| (rect.width(), rect.height()))
}

pub fn set_text(id: &str, text: &str) {
    if let Some(el) = element(id) {
        el.set_text_content(Some(text));
    }
}

pub fn navigate(href: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().set_href(href) {
            log::warn!("navigation to {} failed: {:?}", href, e);
        }
    }
}

/// `document.cookie`, empty when unavailable.
pub fn document_cookies() -> String {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
        .and_then(|d| d.cookie().ok())
        .unwrap_or_default()
}

/// Milliseconds since the epoch, from the JS clock.
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(js_string("it's \"x\""), r#""it's \"x\"""#);
    }

    #[test]
    fn test_parse_events() {
        let events = parse_events(
            r#"[
                {"kind": "marker", "location_id": "abc"},
                {"kind": "viewport", "zoom": 7,
                 "bounds": {"_southWest": {"lat": 50, "lng": 3}, "_northEast": {"lat": 54, "lng": 8}}},
                {"kind": "map_click", "lat": 52.1, "lng": 5.2},
                {"kind": "graph_point", "point": {"x": 1, "y": 2}},
                {"kind": "wobble"}
            ]"#,
        );
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], BridgeEvent::Marker { location_id: "abc".to_string() });
        match &events[1] {
            BridgeEvent::Viewport { bounds, zoom } => {
                assert_eq!(*zoom, 7);
                assert_eq!(bounds.north_east.lng, 8.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_events_garbage() {
        assert!(parse_events("not json").is_empty());
    }
}
