//! FREQ groundwater dashboard
//!
//! Data flow:
//! 1. The server embeds the page state as JSON in `#freq-bootstrap`.
//! 2. On mount the [`Dashboard`] controller is built from it and the first
//!    request of the page goes out.
//! 3. Every interaction asks the controller for at most one request, sends it
//!    through the gateway and hands the response back together with the
//!    request, so responses overtaken by a newer request are dropped.
//! 4. Leaflet and D3 queue their events on `window.__freqEvents`; a timer
//!    drains the queue and dispatches them like any other interaction.

use anyhow::Context;
use dioxus::prelude::*;
use freq_core::api::{FeatureInfoResponse, InterpolationLimitsResponse, LocationsResponse, StageResponse};
use freq_core::bootstrap::{Bootstrap, BOOTSTRAP_ELEMENT_ID};
use freq_core::color::Rgb;
use freq_core::dashboard::{Applied, MarkerClick};
use freq_core::date_range::format_picker;
use freq_core::gateway::{BusyCounter, Gateway, Method};
use freq_core::legend::LegendLayout;
use freq_core::stage::Stage;
use freq_core::view_state::DataRequest;
use freq_core::viewport::MapViewport;
use freq_core::Dashboard;
use freq_ui::components::{
    ChartContainer, ChartHeader, DateRangePicker, DropdownSelector, ErrorDisplay, LegendEditor,
    LoadingSpinner, MapContainer, SpinnerInput, StageTabs, StatisticsPanel,
};
use freq_ui::js_bridge::{self, BridgeEvent};
use freq_ui::state::{AppState, SignalIndicator, Tab};
use freq_ui::storage::LocalStore;
use freq_ui::transport::HttpTransport;
use freq_ui::widgets::{WebCharts, WebMap};
use gloo_timers::future::TimeoutFuture;
use std::rc::Rc;

/// How often queued widget events are drained.
const EVENT_POLL_MS: u32 = 200;

type Controller = Dashboard<LocalStore>;
type Api = Rc<Gateway<HttpTransport>>;

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("freq-root"))
        .launch(App);
}

fn read_bootstrap() -> anyhow::Result<Bootstrap> {
    let json = js_bridge::element_text(BOOTSTRAP_ELEMENT_ID)
        .with_context(|| format!("page has no #{BOOTSTRAP_ELEMENT_ID} element"))?;
    Bootstrap::from_json(&json).context("could not read the page bootstrap data")
}

/// Bootstrap shared with [`Page`]; compared by identity.
#[derive(Clone)]
struct Boot(Rc<Bootstrap>);

impl PartialEq for Boot {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[component]
fn App() -> Element {
    let boot = use_hook(|| read_bootstrap().map(|b| Boot(Rc::new(b))).map_err(|e| format!("{e:#}")));

    match boot {
        Ok(boot) => rsx! { Page { boot } },
        Err(message) => {
            log::error!("{}", message);
            rsx! { ErrorDisplay { message } }
        }
    }
}

/// Copy what the page shows out of the controller.
fn sync_view(dash: &Controller, mut state: AppState) {
    let active = dash.active();
    state.tabs.set(
        Stage::ALL
            .iter()
            .map(|&stage| Tab {
                stage,
                affordance: dash.affordance(stage),
                active: stage == active,
            })
            .collect(),
    );
    state.controls.set(dash.capabilities());
    state.dropdown.set(dash.dropdown().cloned());
    state.spinner.set(dash.spinner().cloned());
    state
        .legend
        .set((active == Stage::Map).then(|| dash.legend_layout()));
    let range = dash.view().date_range();
    state.start_date.set(format_picker(&range.start()));
    state.end_date.set(format_picker(&range.end()));
    state
        .measurement_point
        .set(dash.measurement_point().map(str::to_string));
    state.organisation.set(dash.organisation().to_string());
}

fn report_failure(api: &Api, mut state: AppState) {
    state.error_msg.set(api.last_error());
}

/// Send a request whose response is a stage payload and apply it.
fn send_stage(mut dash: Signal<Controller>, api: Api, state: AppState, request: DataRequest) {
    spawn(async move {
        let delivered = api
            .fetch_json::<StageResponse>(request.method, &request.url, request.params.clone())
            .await;
        match delivered {
            Ok(delivered) => {
                let applied = dash.write().apply_stage_response(
                    &request,
                    delivered,
                    &mut WebCharts::new(),
                    &mut WebMap,
                );
                if let Applied::Applied(report) = applied {
                    for stage in &report.unlocked {
                        log::info!("{} unlocked", stage);
                    }
                    sync_view(&dash.read(), state);
                }
            }
            Err(_) => report_failure(&api, state),
        }
    });
}

/// Send the start page location list request and draw its markers.
fn send_locations(mut dash: Signal<Controller>, api: Api, state: AppState, request: DataRequest) {
    spawn(async move {
        let delivered = api
            .fetch_json::<LocationsResponse>(request.method, &request.url, request.params.clone())
            .await;
        match delivered {
            Ok(delivered) => {
                if let Applied::Applied(report) = dash.write().apply_locations(&request, delivered, &mut WebMap) {
                    log::debug!("{:?} location markers drawn", report.markers);
                }
            }
            Err(_) => report_failure(&api, state),
        }
    });
}

/// Route a request to the handler matching the page it came from.
fn send(dash: Signal<Controller>, api: Api, state: AppState, request: DataRequest) {
    if dash.peek().is_startpage() {
        send_locations(dash, api, state, request);
    } else {
        send_stage(dash, api, state, request);
    }
}

/// Refresh the interpolated groundwater overlay for the current bounds.
fn send_interpolation(dash: Signal<Controller>, api: Api, state: AppState) {
    let url = dash.peek().interpolation_request();
    spawn(async move {
        match api
            .fetch_json::<InterpolationLimitsResponse>(Method::Get, &url, Vec::new())
            .await
        {
            Ok(delivered) => {
                let Some(overlay) = dash.peek().apply_interpolation(delivered) else {
                    return;
                };
                match serde_json::to_string(&overlay) {
                    Ok(json) => js_bridge::set_overlay(&json),
                    Err(e) => log::warn!("could not encode overlay: {}", e),
                }
            }
            Err(_) => report_failure(&api, state),
        }
    });
}

fn send_feature_info(dash: Signal<Controller>, api: Api, state: AppState, lat: f64, lng: f64) {
    let url = dash.peek().feature_info_request(lng, lat);
    spawn(async move {
        match api
            .fetch_json::<FeatureInfoResponse>(Method::Get, &url, Vec::new())
            .await
        {
            Ok(delivered) => {
                let text = dash.peek().apply_feature_info(delivered);
                js_bridge::show_popup(lat, lng, &text);
            }
            Err(_) => report_failure(&api, state),
        }
    });
}

/// Show the edited legend, or why the edit could not be stored.
fn apply_legend(mut state: AppState, edit: freq_core::Result<Option<LegendLayout>>) {
    match edit {
        Ok(Some(layout)) => state.legend.set(Some(layout)),
        Ok(None) => {}
        Err(e) => state.error_msg.set(Some(e.to_string())),
    }
}

fn shows_overlay(dash: &Controller) -> bool {
    dash.active() == Stage::Map && !dash.is_startpage()
}

fn handle_event(mut dash: Signal<Controller>, api: &Api, state: AppState, event: BridgeEvent) {
    match event {
        BridgeEvent::Viewport { bounds, zoom } => {
            let request = dash.write().on_viewport(MapViewport { bounds, zoom });
            if let Some(request) = request {
                send(dash, api.clone(), state, request);
            }
            // The opening viewport issues no data request but still needs
            // its overlay.
            if shows_overlay(&dash.peek()) {
                send_interpolation(dash, api.clone(), state);
            }
        }
        BridgeEvent::Marker { location_id } => {
            let click = dash.write().on_marker_click(&location_id);
            match click {
                MarkerClick::Navigate(href) => js_bridge::navigate(&href),
                MarkerClick::Load(request) => send_stage(dash, api.clone(), state, request),
            }
        }
        BridgeEvent::MapClick { lat, lng } => {
            if shows_overlay(&dash.peek()) {
                send_feature_info(dash, api.clone(), state, lat, lng);
            }
        }
        BridgeEvent::GraphPoint { point } => {
            let request = dash.write().on_graph_click(point);
            send_stage(dash, api.clone(), state, request);
        }
    }
}

#[component]
fn Page(boot: Boot) -> Element {
    let mut state = use_context_provider(AppState::new);
    let mut dash: Signal<Controller> =
        use_signal(|| Dashboard::new(boot.0.as_ref().clone(), LocalStore));
    let api: Api = use_hook(|| {
        let config = dash.peek().config().clone();
        Rc::new(Gateway::new(
            HttpTransport::new(),
            BusyCounter::new(Rc::new(SignalIndicator(state.busy))),
            config.csrf_policy(),
            config.timeout_secs,
        ))
    });

    // ─── Effect: first request of the page ───
    {
        let api = api.clone();
        use_effect(move || {
            js_bridge::init_scripts();
            sync_view(&dash.peek(), state);
            let request = dash.write().initial_request();
            send(dash, api.clone(), state, request);
        });
    }

    // ─── Widget events ───
    {
        let api = api.clone();
        use_future(move || {
            let api = api.clone();
            async move {
                loop {
                    TimeoutFuture::new(EVENT_POLL_MS).await;
                    for event in js_bridge::drain_events() {
                        handle_event(dash, &api, state, event);
                    }
                }
            }
        });
    }

    let on_select = {
        let api = api.clone();
        move |stage: Stage| {
            if stage == dash.peek().active() {
                return;
            }
            let affordance = dash.write().select_stage(stage);
            log::debug!("tab {} is {:?}", stage, affordance);
            if dash.peek().active() == stage {
                let request = dash.write().initial_request();
                send(dash, api.clone(), state, request);
                if shows_overlay(&dash.peek()) {
                    send_interpolation(dash, api.clone(), state);
                }
            }
            sync_view(&dash.peek(), state);
        }
    };

    let on_dates = {
        let api = api.clone();
        move |(start, end): (String, String)| {
            let today = chrono::Local::now().date_naive();
            let result = dash.write().on_picker_input(&start, &end, today);
            match result {
                Ok(Some(request)) => send_stage(dash, api.clone(), state, request),
                Ok(None) => {}
                Err(e) => {
                    log::debug!("picker input not applied: {}", e);
                    return;
                }
            }
            sync_view(&dash.peek(), state);
        }
    };

    let on_dropdown = {
        let api = api.clone();
        move |index: usize| {
            let request = dash.write().on_dropdown(index);
            if let Some(request) = request {
                send_stage(dash, api.clone(), state, request);
            }
            sync_view(&dash.peek(), state);
        }
    };

    let on_spinner_text = {
        let api = api.clone();
        move |text: String| {
            let request = dash.write().on_spinner_text(&text);
            if let Some(request) = request {
                send_stage(dash, api.clone(), state, request);
            }
            sync_view(&dash.peek(), state);
        }
    };

    let on_spinner_step = {
        let api = api.clone();
        move |up: bool| {
            let request = dash.write().on_spinner_step(up);
            if let Some(request) = request {
                send_stage(dash, api.clone(), state, request);
            }
            sync_view(&dash.peek(), state);
        }
    };

    let dismiss = {
        let api = api.clone();
        move |_: ()| {
            api.dismiss_error();
            state.error_msg.set(None);
        }
    };

    let controls = (state.controls)();
    let title = dash.read().active().title();
    let slots = dash.read().config().statistic_slots;
    let (lat, lng) = dash
        .read()
        .selected_location()
        .map(|l| (l.y, l.x))
        .unwrap_or((52.0, 5.0));

    rsx! {
        div {
            style: "max-width: 1100px; margin: 0 auto; padding: 8px; font-family: system-ui, -apple-system, sans-serif;",

            LoadingSpinner {}

            if let Some(err) = state.error_msg.read().as_ref() {
                ErrorDisplay {
                    message: err.clone(),
                    on_dismiss: dismiss,
                }
            }

            StageTabs { on_select }

            ChartHeader { title: title.to_string() }

            div {
                style: "display: flex; flex-wrap: wrap; gap: 16px; align-items: center;",
                if controls.datepicker {
                    DateRangePicker { on_change: on_dates }
                }
                if controls.dropdown {
                    DropdownSelector { on_choose: on_dropdown }
                }
                if controls.spinner {
                    SpinnerInput {
                        on_input: on_spinner_text,
                        on_step: on_spinner_step,
                    }
                }
            }

            MapContainer { lat, lng }

            if let Some(layout) = (state.legend)() {
                LegendEditor {
                    layout,
                    tick_width: dash.read().config().legend_tick_width,
                    on_insert: move |index: usize| {
                        let edit = dash.write().insert_legend_stop(index, &mut WebMap);
                        apply_legend(state, edit);
                    },
                    on_remove: move |index: usize| {
                        let edit = dash.write().remove_legend_stop(index, &mut WebMap);
                        apply_legend(state, edit);
                    },
                    on_recolor: move |(index, color): (usize, Rgb)| {
                        let edit = dash.write().recolor_legend_stop(index, color, &mut WebMap);
                        apply_legend(state, edit);
                    },
                }
            }

            StatisticsPanel { count: slots }

            ChartContainer {
                loading: (state.busy)(),
                min_height: 300,
            }
        }
    }
}
