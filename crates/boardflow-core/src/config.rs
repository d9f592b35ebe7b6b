use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Timing and interaction knobs for the drag/reorder engine.
///
/// Loaded from an optional TOML file; every field falls back to the
/// defaults the web client shipped with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Coalescing window for outbound move requests, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Minimum interval between optimistic re-applications of the same
    /// item, in milliseconds. One animation frame.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// How long to wait for a correlated server response before
    /// treating the move as failed, in milliseconds.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    /// Pointer travel (in pixels) required before a drag session opens.
    #[serde(default = "default_activation_distance")]
    pub activation_distance: f64,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_response_timeout_ms() -> u64 {
    5000
}

fn default_activation_distance() -> f64 {
    8.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            frame_interval_ms: default_frame_interval_ms(),
            response_timeout_ms: default_response_timeout_ms(),
            activation_distance: default_activation_distance(),
        }
    }
}

impl EngineConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|config| config.join("boardflow/config.toml"))
    }

    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(content) = std::fs::read_to_string(&config_path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}
