//! Reusable RSX components for the dashboard page.

mod chart_container;
mod chart_header;
mod date_range_picker;
mod dropdown_selector;
mod error_display;
mod legend_editor;
mod loading_spinner;
mod map_container;
mod spinner_input;
mod stage_tabs;
mod statistics_panel;

pub use chart_container::ChartContainer;
pub use chart_header::ChartHeader;
pub use date_range_picker::DateRangePicker;
pub use dropdown_selector::DropdownSelector;
pub use error_display::ErrorDisplay;
pub use legend_editor::LegendEditor;
pub use loading_spinner::LoadingSpinner;
pub use map_container::{MapContainer, MAP_ELEMENT_ID};
pub use spinner_input::SpinnerInput;
pub use stage_tabs::StageTabs;
pub use statistics_panel::StatisticsPanel;
