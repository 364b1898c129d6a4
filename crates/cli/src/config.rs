//! Configuration management for the CLI

use anyhow::{bail, Context, Result};
use insight_engine::EngineConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// CLI configuration: the engine thresholds plus the presentation-only
/// credit price used to convert raw units to dollars when rendering. The
/// engine itself never sees the price.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    pub engine: EngineConfig,

    #[serde(default = "default_cost_per_credit")]
    pub cost_per_credit: f64,
}

fn default_cost_per_credit() -> f64 {
    2.5
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            cost_per_credit: default_cost_per_credit(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the optional config file and `INSIGHT_*`
    /// environment variables (environment wins).
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_path() {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("INSIGHT"))
            .build()
            .context("failed to assemble configuration")?;

        let config: CliConfig = settings
            .try_deserialize()
            .unwrap_or_else(|_| CliConfig::default());
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine.lookback_days == 0 {
            bail!("lookback_days must be greater than zero");
        }
        if self.cost_per_credit < 0.0 {
            bail!("cost_per_credit must not be negative");
        }
        if self.engine.z_score_warning <= 0.0 || self.engine.z_score_critical <= 0.0 {
            bail!("z-score thresholds must be positive");
        }
        Ok(())
    }
}

/// Optional config file at `~/.config/insight/config.json`.
fn config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("insight").join("config.json"))
}
