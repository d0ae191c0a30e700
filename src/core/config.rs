use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::telemetry::{MetricKind, Thresholds};
use crate::error::SimError;

/// Starting values used when no snapshot is supplied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialValues {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
    /// MB/s
    pub network: f64,
}

impl Default for InitialValues {
    fn default() -> Self {
        Self {
            cpu: 30.0,
            memory: 45.0,
            disk: 60.0,
            network: 2.5,
        }
    }
}

impl InitialValues {
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Cpu => self.cpu,
            MetricKind::Memory => self.memory,
            MetricKind::Disk => self.disk,
            MetricKind::Network => self.network,
        }
    }
}

/// Tick period of each metric, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickCadence {
    pub cpu_ms: u64,
    pub memory_ms: u64,
    pub disk_ms: u64,
    pub network_ms: u64,
}

impl Default for TickCadence {
    fn default() -> Self {
        Self {
            cpu_ms: 1500,
            memory_ms: 2000,
            disk_ms: 5000,
            network_ms: 1000,
        }
    }
}

impl TickCadence {
    pub fn period(&self, kind: MetricKind) -> Duration {
        let ms = match kind {
            MetricKind::Cpu => self.cpu_ms,
            MetricKind::Memory => self.memory_ms,
            MetricKind::Disk => self.disk_ms,
            MetricKind::Network => self.network_ms,
        };
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    pub initial: InitialValues,
    pub cadence: TickCadence,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
    pub background_log_probability: f64,
    pub random_alert_probability: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            initial: InitialValues::default(),
            cadence: TickCadence::default(),
            seed: None,
            background_log_probability: 0.30,
            random_alert_probability: 0.05,
        }
    }
}

impl EngineConfig {
    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(EngineConfig::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // If the file is empty return default config
        if data.trim().is_empty() {
            return Ok(EngineConfig::default());
        }

        let config: EngineConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", config_path))?;

        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("telesim").join("config.json"))
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.thresholds.validate()?;

        for (name, p) in [
            (
                "background_log_probability",
                self.background_log_probability,
            ),
            ("random_alert_probability", self.random_alert_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, p
                )));
            }
        }

        for kind in MetricKind::ALL {
            if !self.initial.get(kind).is_finite() {
                return Err(SimError::config(format!(
                    "initial {} value must be a finite number",
                    kind
                )));
            }
            if self.cadence.period(kind).is_zero() {
                return Err(SimError::config(format!(
                    "{} tick cadence must be greater than zero",
                    kind
                )));
            }
        }

        Ok(())
    }
}
