use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub analysis: AnalysisConfig,
    pub display: DisplayConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub sample_rate: u32,
}

/// Pitch analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub chunk_size: usize,
    pub min_frequency: f32,
    pub max_frequency: f32,
    pub clarity_threshold: f32,
    pub rms_gate: f32,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub history_capacity: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: defaults::CHUNK_SIZE,
            min_frequency: defaults::MIN_FREQUENCY,
            max_frequency: defaults::MAX_FREQUENCY,
            clarity_threshold: defaults::CLARITY_THRESHOLD,
            rms_gate: defaults::RMS_GATE,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            history_capacity: defaults::HISTORY_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PITCHLINE_AUDIO_DEVICE → audio.device
    /// - PITCHLINE_CHUNK_SIZE → analysis.chunk_size
    /// - PITCHLINE_HISTORY → display.history_capacity
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(device) = std::env::var("PITCHLINE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.device = Some(device);
        }

        if let Ok(value) = std::env::var("PITCHLINE_CHUNK_SIZE")
            && let Ok(chunk_size) = value.parse::<usize>()
            && chunk_size > 0
        {
            self.analysis.chunk_size = chunk_size;
        }

        if let Ok(value) = std::env::var("PITCHLINE_HISTORY")
            && let Ok(capacity) = value.parse::<usize>()
            && capacity > 0
        {
            self.display.history_capacity = capacity;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/pitchline/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("pitchline")
            .join("config.toml")
    }
}
