//! View-state synchronization and legend editing for the FREQ groundwater
//! dashboard. Nothing in this crate touches the DOM.

pub mod api;
pub mod bootstrap;
pub mod chart;
pub mod color;
pub mod config;
pub mod controls;
pub mod dashboard;
pub mod date_range;
pub mod error;
pub mod gateway;
pub mod interpolation;
pub mod legend;
pub mod markers;
pub mod stage;
pub mod view_state;
pub mod viewport;

pub use dashboard::Dashboard;
pub use error::{FreqError, Result};
