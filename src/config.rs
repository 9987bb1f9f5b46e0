//! Controller configuration
//!
//! Loaded from `~/.config/simpad-led/config.toml`. Every field has a default,
//! so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use simpad_transport::device_registry;

use crate::error::LedError;

/// Default fade-out duration (ms)
pub const DEFAULT_FADE_MS: u64 = 250;

/// Default delay before retrying a failed LED write (ms)
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedConfig {
    /// USB vendor ID to enumerate
    pub vendor_id: u16,
    /// USB product ID to enumerate
    pub product_id: u16,
    /// Interface number that accepts LED writes
    pub led_interface: i32,
    /// Fade duration used when `start_fade` is given none
    pub fade_ms: u64,
    /// Pause before the worker retries after a failed write
    pub retry_interval_ms: u64,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self {
            vendor_id: device_registry::VENDOR_ID,
            product_id: device_registry::PID_SIMPAD_V2_AE,
            led_interface: device_registry::LED_INTERFACE,
            fade_ms: DEFAULT_FADE_MS,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}

impl LedConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("simpad-led")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> Result<Self, LedError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| LedError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, LedError> {
        toml::from_str(content).map_err(|e| LedError::Config(format!("parse TOML: {e}")))
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}
