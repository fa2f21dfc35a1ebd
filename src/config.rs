//! Engine tunables
//!
//! Every threshold the engine uses lives here. Values can come from a JSON
//! file; missing fields keep their defaults.

use crate::error::{InsightError, InsightResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Dissatisfaction cut-offs for the business risk level (percent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    /// Critical when a Critical-severity report exists and dissatisfaction reaches this
    pub critical_dissatisfaction: f64,
    pub high_dissatisfaction: f64,
    pub medium_dissatisfaction: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical_dissatisfaction: 40.0,
            high_dissatisfaction: 25.0,
            medium_dissatisfaction: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub risk: RiskThresholds,

    /// Share of dissatisfied customers expected to churn
    pub churn_fraction: f64,

    pub max_recommendations: usize,

    pub max_sample_quotes: usize,

    /// Quotes longer than this are cut with an ellipsis
    pub quote_max_chars: usize,

    pub provider_timeout_ms: u64,

    /// Batches at most this large are classified inline
    pub parallel_chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk: RiskThresholds::default(),
            churn_fraction: 0.3,
            max_recommendations: 10,
            max_sample_quotes: 3,
            quote_max_chars: 200,
            provider_timeout_ms: 15_000,
            parallel_chunk_size: 256,
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> InsightResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the user config dir if a file exists there
    pub fn load_or_default() -> InsightResult<Self> {
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading engine config from {:?}", path);
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> InsightResult<()> {
        let r = &self.risk;
        if !(r.medium_dissatisfaction <= r.high_dissatisfaction
            && r.high_dissatisfaction <= r.critical_dissatisfaction)
        {
            return Err(InsightError::config(format!(
                "risk thresholds must be ascending (medium {} <= high {} <= critical {})",
                r.medium_dissatisfaction, r.high_dissatisfaction, r.critical_dissatisfaction
            )));
        }
        if !(0.0..=100.0).contains(&r.medium_dissatisfaction)
            || !(0.0..=100.0).contains(&r.critical_dissatisfaction)
        {
            return Err(InsightError::config("risk thresholds must be within 0-100"));
        }
        if !(0.0..=1.0).contains(&self.churn_fraction) {
            return Err(InsightError::config(format!(
                "churn_fraction must be within 0-1, got {}",
                self.churn_fraction
            )));
        }
        if self.max_recommendations == 0 {
            return Err(InsightError::config("max_recommendations must be at least 1"));
        }
        if self.max_sample_quotes == 0 {
            return Err(InsightError::config("max_sample_quotes must be at least 1"));
        }
        if self.quote_max_chars < 4 {
            return Err(InsightError::config("quote_max_chars must be at least 4"));
        }
        if self.parallel_chunk_size == 0 {
            return Err(InsightError::config("parallel_chunk_size must be at least 1"));
        }
        Ok(())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

/// `<config dir>/feedback-insights/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("feedback-insights").join("config.json"))
}
