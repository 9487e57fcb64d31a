//! Application configuration file.
//!
//! Every section is optional; missing fields take their library defaults.
//!
//! ```json
//! {
//!   "sweep": { "grid": { "lower_kmh": 15, "upper_kmh": 60, "step_kmh": 5 }, "seed": 42 },
//!   "sumo":  { "binary": "sumo", "config_file": "base.sumocfg", "work_dir": "results" },
//!   "report_csv": "results/sweep.csv"
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use vsl_core::SweepConfig;
use vsl_oracle::SumoConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sweep:      SweepConfig,
    pub sumo:       SumoConfig,
    /// Write the per-candidate CSV report here.
    pub report_csv: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("loading config {}", path.display()))
    }

    /// Parse and validate a JSON document.
    pub fn parse(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json).context("parsing config")?;
        config.sweep.validate().context("invalid sweep configuration")?;
        Ok(config)
    }
}
