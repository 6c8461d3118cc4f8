use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// Cadence of the scheduled autosave loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Seconds between periodic saves.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,
    /// Minimum seconds between explicit trigger saves; triggers inside this
    /// window are no-ops.
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: f64,
}

/// Bounds for the audio metadata probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Maximum prefix read from a file before parsing, in KiB. Large enough
    /// for a tag block plus several frames, small enough to bound latency on
    /// huge files.
    #[serde(default = "default_probe_prefix_kib")]
    pub prefix_kib: u64,
}

impl AutosaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs.max(0.01))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_secs_f64(self.debounce_secs.max(0.0))
    }
}

impl ProbeConfig {
    pub fn prefix_bytes(&self) -> u64 {
        self.prefix_kib.max(1) * 1024
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            debounce_secs: default_debounce_secs(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            prefix_kib: default_probe_prefix_kib(),
        }
    }
}

fn default_interval_secs() -> f64 {
    30.0
}

fn default_debounce_secs() -> f64 {
    5.0
}

fn default_probe_prefix_kib() -> u64 {
    512
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("services.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autosave: AutosaveConfig::default(),
            probe: ProbeConfig::default(),
        }
    }
}
