//! Loading pipeline: reads a configuration file, validates it, and builds the
//! core [`LibraryConfig`] plus scheduler settings.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers.

use crate::schema::{DEFAULT_TICK_INTERVAL_MS, LibraryFile};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tapelib_core::admission::AdmissionConfig;
use tapelib_core::library::LibraryConfig;
use tapelib_core::topology::{Topology, TopologyError};

/// Base name looked up when no configuration path is given.
pub const DEFAULT_CONFIG_BASE_NAME: &str = "library";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A value parsed but is out of range.
    #[error("invalid value in {file}: {detail}")]
    Invalid { file: PathBuf, detail: String },

    /// The layout does not describe a buildable library.
    #[error("invalid layout in {file}: {source}")]
    Layout {
        file: PathBuf,
        #[source]
        source: TopologyError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` in `format`. `origin` names the source in errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: origin.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Everything the simulator needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    pub library: LibraryConfig,
    pub tick_interval: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            library: LibraryConfig::default(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
        }
    }
}

impl LibraryFile {
    /// Validate and convert into core configuration. `origin` names the
    /// source in errors.
    pub fn resolve(&self, origin: &Path) -> Result<SimConfig, DataLoadError> {
        let invalid = |detail: String| DataLoadError::Invalid {
            file: origin.to_path_buf(),
            detail,
        };

        if self.scheduler.tick_interval_ms == 0 {
            return Err(invalid("scheduler.tick_interval_ms must be positive".into()));
        }
        if self.events.capacity == 0 {
            return Err(invalid("events.capacity must be positive".into()));
        }
        let (columns, rows) = (self.layout.slot_columns, self.layout.slot_rows);
        if columns > 99 || rows > 99 || self.layout.drives > 99 || self.layout.access_slots > 99 {
            return Err(invalid("layout dimensions must be at most 99".into()));
        }
        let capacity = usize::from(columns) * usize::from(rows);
        if self.layout.initial_tapes.is_none() && self.layout.seeded_tapes > capacity {
            return Err(invalid(format!(
                "layout.seeded_tapes ({}) exceeds the {capacity} storage slots",
                self.layout.seeded_tapes
            )));
        }

        let layout = self.layout.to_spec();
        Topology::build(&layout).map_err(|source| DataLoadError::Layout {
            file: origin.to_path_buf(),
            source,
        })?;

        Ok(SimConfig {
            library: LibraryConfig {
                layout,
                admission: AdmissionConfig {
                    max_queue_depth: self.admission.max_queue_depth,
                },
                event_capacity: self.events.capacity,
            },
            tick_interval: Duration::from_millis(self.scheduler.tick_interval_ms),
        })
    }
}

/// Load and validate a configuration file.
pub fn load_library_config(path: &Path) -> Result<SimConfig, DataLoadError> {
    let file: LibraryFile = deserialize_file(path)?;
    file.resolve(path)
}

/// Load `library.{ron,toml,json}` from `dir` if present, otherwise the
/// stock configuration.
pub fn load_from_dir(dir: &Path) -> Result<SimConfig, DataLoadError> {
    match find_data_file(dir, DEFAULT_CONFIG_BASE_NAME)? {
        Some(path) => load_library_config(&path),
        None => Ok(SimConfig::default()),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tapelib_core::topology::Position;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tapelib_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Clean up a test directory.
    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    fn parse(content: &str, format: Format) -> Result<SimConfig, DataLoadError> {
        let file: LibraryFile = deserialize_str(content, format, Path::new("test"))?;
        file.resolve(Path::new("test"))
    }

    // -----------------------------------------------------------------------
    // detect_format
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("library.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("library.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("library.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        for name in ["library.yaml", "library"] {
            assert!(matches!(
                detect_format(Path::new(name)),
                Err(DataLoadError::UnsupportedFormat { .. })
            ));
        }
    }

    // -----------------------------------------------------------------------
    // find_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found_and_missing() {
        let dir = make_test_dir("find");
        assert_eq!(find_data_file(&dir, "library").unwrap(), None);

        fs::write(dir.join("library.toml"), "").unwrap();
        assert_eq!(
            find_data_file(&dir, "library").unwrap(),
            Some(dir.join("library.toml"))
        );

        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("find_conflict");
        fs::write(dir.join("library.ron"), "()").unwrap();
        fs::write(dir.join("library.json"), "{}").unwrap();

        let result = find_data_file(&dir, "library");
        assert!(matches!(
            result,
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Parsing each format
    // -----------------------------------------------------------------------

    #[test]
    fn ron_sections() {
        let config = parse(
            r#"(
                layout: (slot_columns: 4, slot_rows: 4, picker: Some((x: 3, y: 3))),
                admission: (max_queue_depth: 16),
                scheduler: (tick_interval_ms: 250),
            )"#,
            Format::Ron,
        )
        .unwrap();
        assert_eq!(config.library.layout.slot_columns, 4);
        assert_eq!(config.library.layout.picker, Some(Position::new(3, 3)));
        assert_eq!(config.library.admission.max_queue_depth, 16);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
    }

    #[test]
    fn toml_sections() {
        let config = parse(
            r#"
[layout]
drives = 4
home_slot = "s0003"

[[layout.initial_tapes]]
location = "a0000"
tape = "cleaning"

[events]
capacity = 32
"#,
            Format::Toml,
        )
        .unwrap();
        assert_eq!(config.library.layout.drives, 4);
        assert_eq!(config.library.layout.home_slot, "s0003");
        assert_eq!(config.library.layout.initial_tapes.len(), 1);
        assert_eq!(config.library.event_capacity, 32);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn json_defaults() {
        let config = parse("{}", Format::Json).unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.library, LibraryConfig::default());
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn shallow_queue_is_accepted() {
        // The limit applies to work already queued, so even zero admits a
        // command into an idle library.
        let config = parse(r#"{"admission": {"max_queue_depth": 0}}"#, Format::Json).unwrap();
        assert_eq!(config.library.admission.max_queue_depth, 0);
    }

    #[test]
    fn zero_interval_is_invalid() {
        let err = parse("[scheduler]\ntick_interval_ms = 0\n", Format::Toml).unwrap_err();
        assert!(matches!(err, DataLoadError::Invalid { .. }));
    }

    #[test]
    fn too_many_seeded_tapes_is_invalid() {
        let err = parse(
            r#"{"layout": {"slot_columns": 1, "slot_rows": 2, "home_slot": "s0000"}}"#,
            Format::Json,
        )
        .unwrap_err();
        assert!(err.to_string().contains("seeded_tapes"));
    }

    #[test]
    fn layout_out_of_bounds_is_reported() {
        let err = parse(
            r#"{"layout": {"bounds": {"x_max": 20, "y_max": 20}}}"#,
            Format::Json,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Layout {
                source: TopologyError::OutOfBounds { .. },
                ..
            }
        ));
    }

    #[test]
    fn unknown_home_is_reported() {
        let err = parse(r#"{"layout": {"home_slot": "d0000"}}"#, Format::Json).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Layout {
                source: TopologyError::UnknownHome(_),
                ..
            }
        ));
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = make_test_dir("parse_err");
        let path = dir.join("library.ron");
        fs::write(&path, "this is not valid RON {{{").unwrap();

        let err = load_library_config(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
        assert!(err.to_string().contains("library.ron"));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // load_from_dir
    // -----------------------------------------------------------------------

    #[test]
    fn load_from_dir_falls_back_to_stock() {
        let dir = make_test_dir("fallback");
        assert_eq!(load_from_dir(&dir).unwrap(), SimConfig::default());

        fs::write(dir.join("library.json"), r#"{"scheduler": {"tick_interval_ms": 50}}"#)
            .unwrap();
        let config = load_from_dir(&dir).unwrap();
        assert_eq!(config.tick_interval, Duration::from_millis(50));

        cleanup(&dir);
    }
}
