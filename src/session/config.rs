//! Profiler configuration for a single session.

use crate::utils::config::{
    CONTROL_SCRIPT, DEFAULT_EVENT, DEFAULT_FRAME_BUFFER, DEFAULT_INTERVAL, DEFAULT_STACK_DEPTH,
};
use crate::utils::error::ConfigError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What async-profiler counts for each collapsed stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Counter {
    /// Number of samples
    #[default]
    Samples,
    /// Total event value (nanoseconds, bytes, ...)
    Total,
}

impl Counter {
    /// Lowercase name as understood by `-o collapsed=<name>`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Samples => "samples",
            Self::Total => "total",
        }
    }

    /// Count label shown in rendered graphs
    pub fn unit_label(&self) -> &'static str {
        match self {
            Self::Samples => "samples",
            Self::Total => "units",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable async-profiler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Sampling event, e.g. "cpu", "alloc", "wall"
    pub event: String,

    /// Sampling interval in the event's native units
    pub interval: u64,

    /// Maximum captured stack depth
    pub stack_depth: u32,

    /// Agent frame buffer size
    pub frame_buffer: u64,

    pub counter: Counter,

    /// async-profiler installation directory
    pub profiler_home: PathBuf,

    /// Keep stacks from GC and VM-internal threads
    pub include_system_threads: bool,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            event: DEFAULT_EVENT.to_string(),
            interval: DEFAULT_INTERVAL,
            stack_depth: DEFAULT_STACK_DEPTH,
            frame_buffer: DEFAULT_FRAME_BUFFER,
            counter: Counter::default(),
            profiler_home: PathBuf::new(),
            include_system_threads: false,
        }
    }
}

impl ProfilerConfig {
    pub fn new(profiler_home: impl Into<PathBuf>) -> Self {
        Self {
            profiler_home: profiler_home.into(),
            ..Self::default()
        }
    }

    /// Path of the agent control script
    pub fn control_script(&self) -> PathBuf {
        self.profiler_home.join(CONTROL_SCRIPT)
    }

    /// Graph title prefix, e.g. "CPU"
    pub fn title_prefix(&self) -> String {
        self.event.to_uppercase()
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
            ConfigError::ParseFailed {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_labels() {
        assert_eq!(Counter::Samples.unit_label(), "samples");
        assert_eq!(Counter::Total.unit_label(), "units");
        assert_eq!(Counter::Total.as_str(), "total");
    }

    #[test]
    fn test_control_script_path() {
        let config = ProfilerConfig::new("/opt/async-profiler");
        assert_eq!(
            config.control_script(),
            PathBuf::from("/opt/async-profiler/profiler.sh")
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ProfilerConfig =
            serde_json::from_str(r#"{"event": "alloc", "counter": "total"}"#).unwrap();
        assert_eq!(config.event, "alloc");
        assert_eq!(config.counter, Counter::Total);
        assert_eq!(config.stack_depth, DEFAULT_STACK_DEPTH);
        assert!(!config.include_system_threads);
        assert_eq!(config.title_prefix(), "ALLOC");
    }

    #[test]
    fn test_missing_config_file_is_read_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("absent.json");

        let err = ProfilerConfig::from_json_file(&path).unwrap_err();

        assert!(matches!(err, ConfigError::ReadFailed { .. }));
        assert!(err.to_string().starts_with("Failed to read config"));
    }

    #[test]
    fn test_invalid_config_file_is_parse_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiler.json");
        std::fs::write(&path, r#"{"interval": "often"}"#).unwrap();

        let err = ProfilerConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { .. }));
    }
}
