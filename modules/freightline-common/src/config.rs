use std::env;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

pub const PACING_MS_VAR: &str = "FREIGHTLINE_PACING_MS";
pub const PRICE_PER_KM_VAR: &str = "FREIGHTLINE_PRICE_PER_KM";
pub const BASE_FEE_VAR: &str = "FREIGHTLINE_BASE_FEE";

/// TOML-backed configuration. Every section is optional; missing keys fall
/// back to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub freight: FreightConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationConfig {
    /// Pause between two consecutive driver positions.
    pub pacing_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pacing_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FreightConfig {
    pub price_per_km: f64,
    pub base_fee: f64,
}

impl Default for FreightConfig {
    fn default() -> Self {
        Self {
            price_per_km: 0.15,
            base_fee: 0.30,
        }
    }
}

/// Resolved runtime configuration.
///
/// Precedence: defaults, then the TOML file, then environment variables.
/// CLI flags are applied on top by the binary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub freight: FreightConfig,
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };
        let mut config = Self::from(file);
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, no file.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Apply overrides from a key lookup. `Config::load` passes the process
    /// environment; tests pass a map.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(PACING_MS_VAR) {
            self.simulation.pacing_interval_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{PACING_MS_VAR} must be a whole number of milliseconds"))?;
        }
        if let Some(raw) = lookup(PRICE_PER_KM_VAR) {
            self.freight.price_per_km = raw
                .trim()
                .parse()
                .with_context(|| format!("{PRICE_PER_KM_VAR} must be a number"))?;
        }
        if let Some(raw) = lookup(BASE_FEE_VAR) {
            self.freight.base_fee = raw
                .trim()
                .parse()
                .with_context(|| format!("{BASE_FEE_VAR} must be a number"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let FreightConfig {
            price_per_km,
            base_fee,
        } = self.freight;
        if !price_per_km.is_finite() || price_per_km < 0.0 {
            bail!("freight.price_per_km must be a non-negative number, got {price_per_km}");
        }
        if !base_fee.is_finite() || base_fee < 0.0 {
            bail!("freight.base_fee must be a non-negative number, got {base_fee}");
        }
        Ok(())
    }

    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.simulation.pacing_interval_ms)
    }

    pub fn log_summary(&self) {
        info!(
            pacing_interval_ms = self.simulation.pacing_interval_ms,
            price_per_km = self.freight.price_per_km,
            base_fee = self.freight.base_fee,
            "Configuration loaded"
        );
    }
}

impl From<FileConfig> for Config {
    fn from(file: FileConfig) -> Self {
        Self {
            simulation: file.simulation,
            freight: file.freight,
        }
    }
}

/// Load and parse a TOML config file.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
