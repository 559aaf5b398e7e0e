use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use common::{Error, Result};

use crate::composite::{StrategyConfigItem, MAX_WEIGHT, MIN_WEIGHT};
use crate::params::StrategyParameters;
use crate::strategies::StrategyType;

/// Top-level strategy config file (TOML).
///
/// Example `config/strategies.toml`:
/// ```toml
/// [params]
/// fast_period = 9
/// slow_period = 21
/// rsi_oversold = 30.0
/// arbitrage_reference_asset = "BTCUSDT"
///
/// [params.regime]
/// volatile_threshold = 60.0
///
/// [[strategy]]
/// type = "RSI_REVERSION"
/// weight = 3.0
///
/// [[strategy]]
/// type = "MARTINGALE"
/// enabled = false
/// weight = 2.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(default)]
    pub params: StrategyParameters,
    #[serde(rename = "strategy", default)]
    pub strategies: Vec<StrategyConfigItem>,
}

/// A configuration problem caught before any evaluation runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("strategy type {0} is listed more than once")]
    DuplicateStrategy(StrategyType),

    #[error("weight {weight} for {strategy} is outside 1..=10")]
    WeightOutOfRange { strategy: StrategyType, weight: f64 },

    #[error("parameter '{0}' must be greater than zero")]
    ZeroPeriod(&'static str),

    #[error("'{fast}' must be shorter than '{slow}'")]
    FastNotBelowSlow {
        fast: &'static str,
        slow: &'static str,
    },

    #[error("rsi_overbought ({overbought}) must be above rsi_oversold ({oversold})")]
    RsiThresholds { overbought: f64, oversold: f64 },

    #[error("parameter '{0}' must be positive")]
    NotPositive(&'static str),

    #[error("bollinger_std_dev must not be negative")]
    NegativeStdDev,

    #[error("arbitrage_reference_asset must not be empty")]
    EmptyReferenceAsset,
}

impl StrategyFileConfig {
    /// Read, parse and validate a TOML strategy file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read strategy config at '{path}': {e}"))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate. Unknown strategy type names fail here.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: StrategyFileConfig =
            toml::from_str(content).map_err(|e| Error::Toml(e.to_string()))?;
        cfg.validate().map_err(|e| Error::Config(e.to_string()))?;
        Ok(cfg)
    }

    /// Check the strategy mix and parameters for values the engine would
    /// silently misread.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for item in &self.strategies {
            if !seen.insert(item.strategy_type) {
                return Err(ValidationError::DuplicateStrategy(item.strategy_type));
            }
            if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&item.weight) {
                return Err(ValidationError::WeightOutOfRange {
                    strategy: item.strategy_type,
                    weight: item.weight,
                });
            }
        }

        let p = &self.params;
        for (name, value) in [
            ("fast_period", p.fast_period),
            ("slow_period", p.slow_period),
            ("rsi_period", p.rsi_period),
            ("bollinger_period", p.bollinger_period),
            ("macd_fast", p.macd_fast),
            ("macd_slow", p.macd_slow),
            ("macd_signal", p.macd_signal),
        ] {
            if value == 0 {
                return Err(ValidationError::ZeroPeriod(name));
            }
        }
        if p.fast_period >= p.slow_period {
            return Err(ValidationError::FastNotBelowSlow {
                fast: "fast_period",
                slow: "slow_period",
            });
        }
        if p.macd_fast >= p.macd_slow {
            return Err(ValidationError::FastNotBelowSlow {
                fast: "macd_fast",
                slow: "macd_slow",
            });
        }
        if p.rsi_overbought <= p.rsi_oversold {
            return Err(ValidationError::RsiThresholds {
                overbought: p.rsi_overbought,
                oversold: p.rsi_oversold,
            });
        }
        if p.bollinger_std_dev < 0.0 {
            return Err(ValidationError::NegativeStdDev);
        }
        for (name, value) in [
            ("martingale_price_drop_pct", p.martingale_price_drop_pct),
            ("martingale_profit_target_pct", p.martingale_profit_target_pct),
            ("martingale_volume_multiplier", p.martingale_volume_multiplier),
        ] {
            if value <= 0.0 {
                return Err(ValidationError::NotPositive(name));
            }
        }
        if p.arbitrage_reference_asset.trim().is_empty() {
            return Err(ValidationError::EmptyReferenceAsset);
        }
        Ok(())
    }

    pub fn enabled(&self) -> impl Iterator<Item = &StrategyConfigItem> {
        self.strategies.iter().filter(|s| s.enabled)
    }
}
