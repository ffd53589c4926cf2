use std::path::PathBuf;

/// Errors that stop the simulator.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The configuration file could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] tapelib_data::DataLoadError),

    /// The configured layout could not be built.
    #[error("layout error from {origin}: {source}")]
    Layout {
        origin: PathBuf,
        source: tapelib_core::topology::TopologyError,
    },

    /// Reading commands or writing responses failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
