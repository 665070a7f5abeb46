//! User-editable color ramp behind the map legend.
//!
//! The ramp is an ordered list of colors whose positions are implicit: entry
//! `i` of `n` sits at `i / (n - 1)` of the way between the latest data
//! extremes. Every edit is persisted to durable client storage as a JSON array
//! of `{"color": "#rrggbb"}` objects before it becomes visible in memory.

use crate::color::{ColorScale, Rgb};
use crate::error::{FreqError, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// Storage key the ramp is persisted under.
pub const LEGEND_STORAGE_KEY: &str = "legendLabels";

/// Minimum number of entries a ramp may hold.
pub const MIN_STOPS: usize = 2;

/// One ramp entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendStop {
    pub color: Rgb,
}

/// Ordered color ramp, never shorter than [`MIN_STOPS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LegendRamp(Vec<LegendStop>);

impl LegendRamp {
    /// `None` when fewer than two colors are supplied.
    pub fn new(colors: impl IntoIterator<Item = Rgb>) -> Option<Self> {
        let stops: Vec<LegendStop> = colors.into_iter().map(|color| LegendStop { color }).collect();
        (stops.len() >= MIN_STOPS).then_some(Self(stops))
    }

    /// Green, teal, blue.
    pub fn default_ramp() -> Self {
        Self(vec![
            LegendStop { color: Rgb::new(0x2e, 0xcc, 0x71) },
            LegendStop { color: Rgb::new(0x1a, 0xbc, 0x9c) },
            LegendStop { color: Rgb::new(0x34, 0x98, 0xdb) },
        ])
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let stops: Vec<LegendStop> = serde_json::from_str(json)?;
        if stops.len() < MIN_STOPS {
            return Err(FreqError::Storage(format!(
                "stored ramp has {} entries, need at least {}",
                stops.len(),
                MIN_STOPS
            )));
        }
        Ok(Self(stops))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn stops(&self) -> &[LegendStop] {
        &self.0
    }

    pub fn colors(&self) -> Vec<Rgb> {
        self.0.iter().map(|stop| stop.color).collect()
    }

    /// Insert `color` directly after `after_index`.
    pub fn insert_stop(&mut self, after_index: usize, color: Rgb) -> bool {
        if after_index >= self.0.len() {
            return false;
        }
        self.0.insert(after_index + 1, LegendStop { color });
        true
    }

    /// Remove entry `index`, refusing to shrink below two entries.
    pub fn remove_stop(&mut self, index: usize) -> bool {
        if self.0.len() <= MIN_STOPS || index >= self.0.len() {
            return false;
        }
        self.0.remove(index);
        true
    }

    pub fn recolor(&mut self, index: usize, color: Rgb) -> bool {
        match self.0.get_mut(index) {
            Some(stop) if stop.color != color => {
                stop.color = color;
                true
            }
            _ => false,
        }
    }

    /// Linear color scale over `[min, max]`.
    pub fn scale(&self, min: f64, max: f64) -> ColorScale {
        ColorScale::new(min, max, self.colors())
    }
}

/// Durable client storage holding serialized ramps.
pub trait RampStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory [`RampStore`], used off-browser and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn with_item(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.items.borrow_mut().insert(key.to_string(), value.to_string());
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl RampStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: RampStore + ?Sized> RampStore for std::rc::Rc<S> {
    fn load(&self, key: &str) -> Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        (**self).save(key, value)
    }
}

/// Geometry settings for [`LegendEditor::render`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendGeometry {
    pub width: f64,
    pub height: f64,
    pub tick_width: f64,
    pub axis_ticks: usize,
}

impl Default for LegendGeometry {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 30.0,
            tick_width: 6.0,
            axis_ticks: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset_percent: f64,
    pub color: Rgb,
}

/// Draggable/clickable handle over ramp entry `index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Handle {
    pub index: usize,
    pub x: f64,
    pub color: Rgb,
}

/// Invisible region between entries `after_index` and `after_index + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertRegion {
    pub after_index: usize,
    pub x: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub x: f64,
    pub label: String,
}

/// Everything needed to draw the legend once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendLayout {
    pub width: f64,
    pub height: f64,
    pub domain: (f64, f64),
    pub stops: Vec<GradientStop>,
    pub handles: Vec<Handle>,
    pub regions: Vec<InsertRegion>,
    pub ticks: Vec<Tick>,
}

/// Format an axis value with at most two decimals and no trailing zeros.
pub fn format_tick(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Owns the live ramp, its store, and the data extremes the axis spans.
pub struct LegendEditor<S> {
    ramp: LegendRamp,
    store: S,
    key: String,
    insert_color: Rgb,
    data_min: f64,
    data_max: f64,
}

impl<S: RampStore> LegendEditor<S> {
    /// Load the ramp from `store`, falling back to `default` when the stored
    /// value is missing or unusable, and write the result back.
    pub fn load(store: S, key: &str, default: LegendRamp, insert_color: Rgb) -> Self {
        let ramp = match store.load(key) {
            Ok(Some(json)) => LegendRamp::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Discarding stored legend ramp: {}", e);
                default.clone()
            }),
            Ok(None) => default,
            Err(e) => {
                log::warn!("Could not read legend ramp: {}", e);
                default
            }
        };
        if let Err(e) = store.save(key, &ramp.to_json()) {
            log::warn!("Could not persist legend ramp: {}", e);
        }
        Self {
            ramp,
            store,
            key: key.to_string(),
            insert_color,
            data_min: 0.0,
            data_max: 1.0,
        }
    }

    pub fn ramp(&self) -> &LegendRamp {
        &self.ramp
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn extremes(&self) -> (f64, f64) {
        (self.data_min, self.data_max)
    }

    /// Rescale the axis to freshly fetched extremes. Non-finite bounds fall
    /// back to 0 and 1 respectively.
    pub fn set_extremes(&mut self, min: f64, max: f64) {
        self.data_min = if min.is_finite() { min } else { 0.0 };
        self.data_max = if max.is_finite() { max } else { 1.0 };
    }

    pub fn scale(&self) -> ColorScale {
        self.ramp.scale(self.data_min, self.data_max)
    }

    /// Split the ramp after `after_index` with the neutral insert color.
    pub fn insert_stop(&mut self, after_index: usize) -> Result<bool> {
        let color = self.insert_color;
        self.commit(|ramp| ramp.insert_stop(after_index, color))
    }

    /// Delete entry `index`; a two-entry ramp is left untouched.
    pub fn remove_stop(&mut self, index: usize) -> Result<bool> {
        self.commit(|ramp| ramp.remove_stop(index))
    }

    pub fn recolor(&mut self, index: usize, color: Rgb) -> Result<bool> {
        self.commit(|ramp| ramp.recolor(index, color))
    }

    /// Apply `edit` to a copy, persist it, then swap it in. Storage failures
    /// leave the live ramp unchanged.
    fn commit(&mut self, edit: impl FnOnce(&mut LegendRamp) -> bool) -> Result<bool> {
        let mut next = self.ramp.clone();
        if !edit(&mut next) {
            return Ok(false);
        }
        self.store.save(&self.key, &next.to_json())?;
        self.ramp = next;
        Ok(true)
    }

    /// Lay out the gradient bar, handles, insert regions and axis.
    pub fn render(&self, geometry: &LegendGeometry) -> LegendLayout {
        let n = self.ramp.len();
        let width = geometry.width;
        let segment = width / (n - 1) as f64;
        let x_pos = |i: usize| segment * i as f64;

        let stops = self
            .ramp
            .stops()
            .iter()
            .enumerate()
            .map(|(i, stop)| GradientStop {
                offset_percent: i as f64 / (n - 1) as f64 * 100.0,
                color: stop.color,
            })
            .collect();

        let handles = self
            .ramp
            .stops()
            .iter()
            .enumerate()
            .map(|(i, stop)| {
                let x = if i == 0 {
                    geometry.tick_width / 2.0
                } else if i == n - 1 {
                    x_pos(i) - geometry.tick_width / 2.0
                } else {
                    x_pos(i)
                };
                Handle { index: i, x, color: stop.color }
            })
            .collect();

        let regions = (0..n - 1)
            .map(|i| InsertRegion {
                after_index: i,
                x: x_pos(i),
                width: segment,
            })
            .collect();

        LegendLayout {
            width,
            height: geometry.height,
            domain: (self.data_min, self.data_max),
            stops,
            handles,
            regions,
            ticks: self.axis_ticks(width, geometry.axis_ticks),
        }
    }

    fn axis_ticks(&self, width: f64, count: usize) -> Vec<Tick> {
        let (min, max) = (self.data_min, self.data_max);
        let span = max - min;
        if count < 2 || span <= 0.0 {
            return vec![Tick { value: min, x: 0.0, label: format_tick(min) }];
        }
        (0..count)
            .map(|i| {
                let fraction = i as f64 / (count - 1) as f64;
                let value = min + span * fraction;
                Tick { value, x: width * fraction, label: format_tick(value) }
            })
            .collect()
    }
}

/// Separates a single click (open the color picker) from a double click
/// (delete the entry) on the same handle.
///
/// A single click is acted on after [`ClickArbiter::CLICK_DELAY_MS`]; a
/// double click suppresses pending single clicks for
/// [`ClickArbiter::SUPPRESS_MS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ClickArbiter {
    suppressed_until: Option<f64>,
}

impl ClickArbiter {
    pub const CLICK_DELAY_MS: u32 = 250;
    pub const SUPPRESS_MS: f64 = 1000.0;

    pub fn on_double_click(&mut self, now_ms: f64) {
        self.suppressed_until = Some(now_ms + Self::SUPPRESS_MS);
    }

    /// Called once the click delay has elapsed.
    pub fn should_open_picker(&self, now_ms: f64) -> bool {
        !matches!(self.suppressed_until, Some(until) if now_ms < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::rc::Rc;

    fn editor_with(colors: &[&str]) -> LegendEditor<Rc<MemoryStore>> {
        let ramp = LegendRamp::new(colors.iter().map(|c| c.parse().unwrap())).unwrap();
        let store = Rc::new(MemoryStore::with_item(LEGEND_STORAGE_KEY, &ramp.to_json()));
        LegendEditor::load(store, LEGEND_STORAGE_KEY, LegendRamp::default_ramp(), Rgb::WHITE)
    }

    /// Store that rejects every write.
    struct ReadOnlyStore;

    impl RampStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn save(&self, _key: &str, _value: &str) -> Result<()> {
            Err(FreqError::Storage("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_ramp_json_shape() {
        let json = LegendRamp::default_ramp().to_json();
        assert_eq!(
            json,
            r##"[{"color":"#2ecc71"},{"color":"#1abc9c"},{"color":"#3498db"}]"##
        );
    }

    #[test]
    fn test_ramp_round_trip_preserves_order() {
        let ramp = LegendRamp::new(
            ["#ff0000", "#00ff00", "#0000ff", "#123456"]
                .iter()
                .map(|c| c.parse().unwrap()),
        )
        .unwrap();
        let back = LegendRamp::from_json(&ramp.to_json()).unwrap();
        assert_eq!(back.colors(), ramp.colors());
    }

    #[test]
    fn test_load_missing_uses_default_and_persists() {
        let store = Rc::new(MemoryStore::default());
        let editor = LegendEditor::load(
            store.clone(),
            LEGEND_STORAGE_KEY,
            LegendRamp::default_ramp(),
            Rgb::WHITE,
        );
        assert_eq!(editor.ramp(), &LegendRamp::default_ramp());
        assert_eq!(
            store.get(LEGEND_STORAGE_KEY),
            Some(LegendRamp::default_ramp().to_json())
        );
    }

    #[test]
    fn test_load_corrupt_or_short_falls_back() {
        for stored in ["not json", r##"[{"color":"#ffffff"}]"##, r#"[{"color":"blue"}]"#] {
            let store = MemoryStore::with_item(LEGEND_STORAGE_KEY, stored);
            let editor = LegendEditor::load(
                store,
                LEGEND_STORAGE_KEY,
                LegendRamp::default_ramp(),
                Rgb::WHITE,
            );
            assert_eq!(editor.ramp(), &LegendRamp::default_ramp(), "input {stored}");
        }
    }

    #[test]
    fn test_remove_at_two_is_noop_and_storage_unchanged() {
        let mut editor = editor_with(&["#000000", "#ffffff"]);
        let before = editor.store().get(LEGEND_STORAGE_KEY);
        assert!(!editor.remove_stop(0).unwrap());
        assert_eq!(editor.ramp().len(), 2);
        assert_eq!(editor.store().get(LEGEND_STORAGE_KEY), before);
    }

    #[test]
    fn test_remove_persists_new_ramp() {
        let mut editor = editor_with(&["#2ecc71", "#1abc9c", "#3498db"]);
        assert!(editor.remove_stop(1).unwrap());
        let stored = editor.store().get(LEGEND_STORAGE_KEY).unwrap();
        assert_eq!(
            LegendRamp::from_json(&stored).unwrap().colors(),
            vec!["#2ecc71".parse().unwrap(), "#3498db".parse().unwrap()]
        );
    }

    #[test]
    fn test_insert_uses_neutral_color_after_index() {
        let mut editor = editor_with(&["#000000", "#111111"]);
        assert!(editor.insert_stop(0).unwrap());
        assert_eq!(editor.ramp().colors()[1], Rgb::WHITE);
        assert!(!editor.insert_stop(9).unwrap());
        assert_eq!(editor.ramp().len(), 3);
    }

    #[test]
    fn test_recolor_persists() {
        let mut editor = editor_with(&["#000000", "#111111"]);
        let red: Rgb = "#ff0000".parse().unwrap();
        assert!(editor.recolor(1, red).unwrap());
        let stored = editor.store().get(LEGEND_STORAGE_KEY).unwrap();
        assert_eq!(LegendRamp::from_json(&stored).unwrap().colors()[1], red);
        assert!(!editor.recolor(5, red).unwrap());
    }

    #[test]
    fn test_failed_persist_leaves_ramp_untouched() {
        let mut editor = LegendEditor::load(
            ReadOnlyStore,
            LEGEND_STORAGE_KEY,
            LegendRamp::default_ramp(),
            Rgb::WHITE,
        );
        assert!(editor.insert_stop(0).is_err());
        assert_eq!(editor.ramp(), &LegendRamp::default_ramp());
    }

    #[test]
    fn test_render_scenario_three_colors() {
        let mut editor = editor_with(&["#2ecc71", "#1abc9c", "#3498db"]);
        editor.set_extremes(0.5, 2.5);
        let layout = editor.render(&LegendGeometry::default());
        let offsets: Vec<f64> = layout.stops.iter().map(|s| s.offset_percent).collect();
        assert_eq!(offsets, vec![0.0, 50.0, 100.0]);
        assert_eq!(layout.domain, (0.5, 2.5));
        assert_eq!(layout.ticks.first().unwrap().value, 0.5);
        assert_eq!(layout.ticks.last().unwrap().value, 2.5);
        assert_eq!(layout.ticks.first().unwrap().label, "0.5");
        assert_eq!(layout.ticks.last().unwrap().x, 300.0);
    }

    #[test]
    fn test_render_handle_insets_and_regions() {
        let editor = editor_with(&["#2ecc71", "#1abc9c", "#3498db"]);
        let geometry = LegendGeometry::default();
        let layout = editor.render(&geometry);
        assert_eq!(layout.handles[0].x, 3.0);
        assert_eq!(layout.handles[1].x, 150.0);
        assert_eq!(layout.handles[2].x, 297.0);
        assert_eq!(layout.regions.len(), 2);
        assert_eq!(layout.regions[1].x, 150.0);
        assert_eq!(layout.regions[1].width, 150.0);
    }

    #[test]
    fn test_axis_rescales_without_ramp_change() {
        let mut editor = editor_with(&["#000000", "#ffffff"]);
        editor.set_extremes(0.0, 10.0);
        let first = editor.render(&LegendGeometry::default());
        editor.set_extremes(-4.0, 4.0);
        let second = editor.render(&LegendGeometry::default());
        assert_eq!(first.stops, second.stops);
        assert_ne!(first.ticks, second.ticks);
        assert_eq!(second.ticks[2].value, 0.0);
    }

    #[test]
    fn test_non_finite_extremes_fall_back() {
        let mut editor = editor_with(&["#000000", "#ffffff"]);
        editor.set_extremes(f64::NAN, f64::INFINITY);
        assert_eq!(editor.extremes(), (0.0, 1.0));
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(1.0), "1");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-0.001), "0");
        assert_eq!(format_tick(1234.5), "1234.5");
    }

    #[test]
    fn test_click_arbiter() {
        let mut arbiter = ClickArbiter::default();
        assert!(arbiter.should_open_picker(0.0));
        arbiter.on_double_click(100.0);
        assert!(!arbiter.should_open_picker(350.0));
        assert!(arbiter.should_open_picker(1100.0));
    }

    fn arb_ramp(min_len: usize) -> impl Strategy<Value = Vec<Rgb>> {
        prop::collection::vec(
            (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b)),
            min_len..12,
        )
    }

    proptest! {
        #[test]
        fn prop_remove_shrinks_by_one(colors in arb_ramp(3), pick in any::<prop::sample::Index>()) {
            let ramp = LegendRamp::new(colors.clone()).unwrap();
            let store = Rc::new(MemoryStore::with_item(LEGEND_STORAGE_KEY, &ramp.to_json()));
            let mut editor = LegendEditor::load(store.clone(), LEGEND_STORAGE_KEY, LegendRamp::default_ramp(), Rgb::WHITE);
            let index = pick.index(colors.len());
            prop_assert!(editor.remove_stop(index).unwrap());
            prop_assert_eq!(editor.ramp().len(), colors.len() - 1);
            let stored = LegendRamp::from_json(&store.get(LEGEND_STORAGE_KEY).unwrap()).unwrap();
            prop_assert_eq!(&stored, editor.ramp());
        }

        #[test]
        fn prop_insert_grows_and_ticks_stay_even(
            colors in arb_ramp(2),
            pick in any::<prop::sample::Index>(),
            min in -1e4..1e4f64,
            span in 1e-3..1e4f64,
        ) {
            let ramp = LegendRamp::new(colors.clone()).unwrap();
            let store = MemoryStore::with_item(LEGEND_STORAGE_KEY, &ramp.to_json());
            let mut editor = LegendEditor::load(store, LEGEND_STORAGE_KEY, LegendRamp::default_ramp(), Rgb::WHITE);
            prop_assert!(editor.insert_stop(pick.index(colors.len())).unwrap());
            prop_assert_eq!(editor.ramp().len(), colors.len() + 1);

            editor.set_extremes(min, min + span);
            let layout = editor.render(&LegendGeometry::default());
            let ticks = &layout.ticks;
            prop_assert!((ticks[0].value - min).abs() < 1e-9);
            prop_assert!((ticks[ticks.len() - 1].value - (min + span)).abs() < 1e-6);
            let step = ticks[1].x - ticks[0].x;
            for pair in ticks.windows(2) {
                prop_assert!(((pair[1].x - pair[0].x) - step).abs() < 1e-9);
            }
            let n = layout.stops.len();
            for (i, stop) in layout.stops.iter().enumerate() {
                prop_assert!((stop.offset_percent - i as f64 / (n - 1) as f64 * 100.0).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_persist_then_load_round_trips(colors in arb_ramp(2)) {
            let ramp = LegendRamp::new(colors.clone()).unwrap();
            let store = MemoryStore::default();
            store.save(LEGEND_STORAGE_KEY, &ramp.to_json()).unwrap();
            let editor = LegendEditor::load(store, LEGEND_STORAGE_KEY, LegendRamp::default_ramp(), Rgb::WHITE);
            prop_assert_eq!(editor.ramp().colors(), colors);
        }
    }
}
