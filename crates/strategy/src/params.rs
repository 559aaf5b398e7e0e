use serde::{Deserialize, Serialize};

use crate::regime::RegimeTuning;

/// Periods and thresholds shared by every strategy evaluator for one run.
///
/// Treated as an immutable snapshot during an evaluation. Percentages are
/// expressed in percent (2.0 = 2%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParameters {
    pub fast_period: usize,
    pub slow_period: usize,

    pub rsi_period: usize,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,

    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,

    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,

    /// Drop from the most recent entry that triggers another lot.
    pub martingale_price_drop_pct: f64,
    /// Gain over the volume-weighted average entry that closes all lots.
    pub martingale_profit_target_pct: f64,
    /// Size of the next lot relative to the most recent one.
    pub martingale_volume_multiplier: f64,

    /// Market leader used by the correlation arbitrage strategy.
    pub arbitrage_reference_asset: String,

    pub regime: RegimeTuning,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Self {
            fast_period: 9,
            slow_period: 21,
            rsi_period: 14,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            martingale_price_drop_pct: 2.0,
            martingale_profit_target_pct: 1.5,
            martingale_volume_multiplier: 2.0,
            arbitrage_reference_asset: "BTCUSDT".to_string(),
            regime: RegimeTuning::default(),
        }
    }
}
