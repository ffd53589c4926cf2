//! Tapelib Data -- library configuration files.
//!
//! A configuration file describes the layout, admission limits, scheduler
//! interval and event log capacity of a simulated library, in RON, TOML or
//! JSON. Missing fields take the stock values.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, SimConfig, load_from_dir, load_library_config};
