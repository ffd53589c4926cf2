//! Tapelib Sim -- a headless tape library simulator process.
//!
//! Loads a library configuration, then runs a single-threaded scheduler
//! that ticks the library on a fixed interval and answers operator commands
//! read line by line.
//!
//! # Usage
//!
//! ```text
//! $ tapelib-sim config/library.ron
//! load slot=s0000 drive=d0100
//! {"command":"load","tasks":4,"message":"Loading from s0000 to d0100"}
//! state
//! {"locked":false,"busy":true}
//! ```

pub mod error;
pub mod protocol;
pub mod scheduler;

pub use error::SimError;
pub use scheduler::{RunSummary, Simulator};

use std::path::Path;
use tapelib_core::library::Library;
use tapelib_data::SimConfig;

/// Load the configuration at `path`, or from `library.{ron,toml,json}` in
/// `dir` when no path is given, and build the simulator.
pub fn build_simulator(path: Option<&Path>, dir: &Path) -> Result<Simulator, SimError> {
    let (config, origin): (SimConfig, &Path) = match path {
        Some(path) => (tapelib_data::load_library_config(path)?, path),
        None => (tapelib_data::load_from_dir(dir)?, dir),
    };
    let library = Library::new(&config.library).map_err(|source| SimError::Layout {
        origin: origin.to_path_buf(),
        source,
    })?;
    Ok(Simulator::new(library, config.tick_interval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_simulator_from_empty_dir() {
        let dir = std::env::temp_dir().join(format!("tapelib_sim_stock_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let sim = build_simulator(None, &dir).unwrap();
        assert_eq!(sim.library().topology().len(), 176 + 6 + 2 + 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sample_config_loads() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config/library.ron"));
        let sim = build_simulator(Some(path), Path::new(".")).unwrap();
        assert!(sim.library().is_running());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = build_simulator(Some(Path::new("/nonexistent/library.toml")), Path::new("."));
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}
