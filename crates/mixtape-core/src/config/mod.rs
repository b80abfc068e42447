//! Engine configuration
//!
//! Stored as YAML, default location `~/.config/mixtape/config.yaml`.
//! Every section is `#[serde(default)]`, so a partial file only overrides
//! what it names. Values that would stall the engine (zero-length timer
//! periods, out-of-range volume) are replaced on load.
//!
//! ```ignore
//! use mixtape_core::config::{default_config_path, EngineConfig};
//!
//! let config = EngineConfig::load(&default_config_path());
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Timer periods and windows
    pub timing: TimingConfig,
    /// Transport defaults and button step sizes
    pub transport: TransportConfig,
    /// Track metadata lookup
    pub metadata: MetadataConfig,
    /// Share link settings
    pub share: ShareConfig,
}

impl EngineConfig {
    /// Load from `path`, falling back to defaults
    ///
    /// A missing file is normal on first run. An unreadable or malformed
    /// file is reported and ignored; the engine always gets a usable config.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("config: no file at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                log::info!("config: loaded {:?}", path);
                config.validated()
            }
            Err(e) => {
                log::warn!("config: {:#}, using defaults", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {:?}", path))?;
        serde_yaml::from_str(&contents).with_context(|| format!("cannot parse {:?}", path))
    }

    /// Replace values the engine cannot run with
    pub fn validated(mut self) -> Self {
        let defaults = TimingConfig::default();
        let timing = &mut self.timing;
        for (name, value, fallback) in [
            ("position_poll_ms", &mut timing.position_poll_ms, defaults.position_poll_ms),
            ("volume_overlay_ms", &mut timing.volume_overlay_ms, defaults.volume_overlay_ms),
            ("lock_flash_ms", &mut timing.lock_flash_ms, defaults.lock_flash_ms),
            ("layout_debounce_ms", &mut timing.layout_debounce_ms, defaults.layout_debounce_ms),
        ] {
            if *value == 0 {
                log::warn!("config: timing.{} must be positive, using {}", name, fallback);
                *value = fallback;
            }
        }

        if self.transport.initial_volume > 100 {
            log::warn!(
                "config: transport.initial_volume {} above 100, clamping",
                self.transport.initial_volume
            );
            self.transport.initial_volume = 100;
        }

        if !self.transport.seek_step_secs.is_finite() || self.transport.seek_step_secs <= 0.0 {
            log::warn!(
                "config: transport.seek_step_secs {} invalid, using default",
                self.transport.seek_step_secs
            );
            self.transport.seek_step_secs = TransportConfig::default().seek_step_secs;
        }

        if self.metadata.timeout_secs == 0 {
            log::warn!("config: metadata.timeout_secs must be positive, using default");
            self.metadata.timeout_secs = MetadataConfig::default().timeout_secs;
        }

        self
    }
}

/// Timing section (all values in milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Position poll period while playing
    pub position_poll_ms: u64,
    /// How long the volume indicator stays up after the last change
    pub volume_overlay_ms: u64,
    /// How long the HOLD flash stays up after a blocked press
    pub lock_flash_ms: u64,
    /// Quiet period before layout changes are written to the URL
    pub layout_debounce_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            position_poll_ms: 250,
            volume_overlay_ms: 1500,
            lock_flash_ms: 1200,
            layout_debounce_ms: 500,
        }
    }
}

impl TimingConfig {
    pub fn position_poll(&self) -> Duration {
        Duration::from_millis(self.position_poll_ms)
    }

    pub fn volume_overlay(&self) -> Duration {
        Duration::from_millis(self.volume_overlay_ms)
    }

    pub fn lock_flash(&self) -> Duration {
        Duration::from_millis(self.lock_flash_ms)
    }

    pub fn layout_debounce(&self) -> Duration {
        Duration::from_millis(self.layout_debounce_ms)
    }
}

/// Transport section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Volume at session start (0-100)
    pub initial_volume: u8,
    /// Volume change per button press
    pub volume_step: i32,
    /// Seek distance per button press, in seconds
    pub seek_step_secs: f64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            initial_volume: 80,
            volume_step: 10,
            seek_step_secs: 10.0,
        }
    }
}

/// Metadata lookup section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// oEmbed endpoint queried for track titles
    pub endpoint: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Label cached for tracks whose lookup failed
    pub placeholder: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.youtube.com/oembed".to_string(),
            timeout_secs: 5,
            placeholder: "Unknown".to_string(),
        }
    }
}

impl MetadataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Share link section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Page URL that share tokens are appended to
    pub base_url: Option<String>,
}

/// Get the default config file path
///
/// Returns: `~/.config/mixtape/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("mixtape")
        .join("config.yaml")
}
