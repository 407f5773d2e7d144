//! Serializable backtest configuration, loaded from TOML.
//!
//! ```toml
//! [data]
//! from_tz = "US/Central"
//! to_tz = "Asia/Kolkata"
//!
//! [strategy]
//! ema_span = 100
//! warmup_bars = 100
//! doji_body_ratio = 0.1
//! volume_lookback = 3
//! ```
//!
//! Every key is optional. Unknown keys are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dojiback_core::engine::{EngineConfig, DEFAULT_EMA_SPAN};
use dojiback_core::patterns::DojiRule;

/// Unique identifier for a backtest configuration (content-addressable hash).
pub type RunId = String;

pub const DEFAULT_FROM_TZ: &str = "US/Central";
pub const DEFAULT_TO_TZ: &str = "Asia/Kolkata";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacktestConfig {
    pub data: DataConfig,
    pub strategy: StrategyConfig,
}

/// Timezone handling for CSV timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Zone naive timestamps in the file are written in.
    pub from_tz: String,
    /// Zone the engine and weekday statistics see.
    pub to_tz: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            from_tz: DEFAULT_FROM_TZ.to_string(),
            to_tz: DEFAULT_TO_TZ.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyConfig {
    pub ema_span: usize,
    /// Defaults to `ema_span` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warmup_bars: Option<usize>,
    pub doji_body_ratio: f64,
    pub volume_lookback: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        let rule = DojiRule::default();
        Self {
            ema_span: DEFAULT_EMA_SPAN,
            warmup_bars: None,
            doji_body_ratio: rule.max_body_ratio,
            volume_lookback: rule.volume_lookback,
        }
    }
}

impl BacktestConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Engine settings with the warm-up resolved.
    pub fn to_engine_config(&self) -> EngineConfig {
        let s = &self.strategy;
        EngineConfig {
            ema_span: s.ema_span,
            warmup_bars: s.warmup_bars.unwrap_or(s.ema_span),
            doji_body_ratio: s.doji_body_ratio,
            volume_lookback: s.volume_lookback,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_engine_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Deterministic BLAKE3 hash of this configuration.
    ///
    /// Two runs with identical settings share a `RunId`.
    pub fn run_id(&self) -> RunId {
        // Plain data with string keys; serialization cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
