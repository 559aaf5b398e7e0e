//! Per-strategy signal evaluators.
//!
//! Every evaluator has the same shape, [`Evaluator`], and reads everything it
//! needs from a [`StrategyContext`]. [`StrategyType::evaluator`] is the
//! dispatch table; adding a strategy means one new variant and one new arm.

pub mod arbitrage;
pub mod crossover;
pub mod macd_trend;
pub mod martingale;
pub mod reversion;

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use common::{Candle, Position, Signal};

use crate::indicators::closes;
use crate::params::StrategyParameters;
use crate::regime::{classify_regime_with, MarketRegime};

/// Candle history per asset identifier, read-only during an evaluation.
pub type AssetCandles = HashMap<String, Vec<Candle>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyType {
    MaCrossover,
    EmaCrossover,
    RsiReversion,
    BollingerBreakout,
    MacdTrend,
    Martingale,
    CorrelationArbitrage,
}

/// How a strategy behaves across regimes; drives the weight auto-tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyFamily {
    TrendFollowing,
    MeanReversion,
    PositionAware,
    CrossAsset,
}

impl StrategyType {
    pub const ALL: [StrategyType; 7] = [
        StrategyType::MaCrossover,
        StrategyType::EmaCrossover,
        StrategyType::RsiReversion,
        StrategyType::BollingerBreakout,
        StrategyType::MacdTrend,
        StrategyType::Martingale,
        StrategyType::CorrelationArbitrage,
    ];

    pub fn evaluator(self) -> Evaluator {
        match self {
            StrategyType::MaCrossover => crossover::ma_crossover,
            StrategyType::EmaCrossover => crossover::ema_crossover,
            StrategyType::RsiReversion => reversion::rsi_reversion,
            StrategyType::BollingerBreakout => reversion::bollinger_breakout,
            StrategyType::MacdTrend => macd_trend::macd_trend,
            StrategyType::Martingale => martingale::martingale,
            StrategyType::CorrelationArbitrage => arbitrage::correlation_arbitrage,
        }
    }

    pub fn family(self) -> StrategyFamily {
        match self {
            StrategyType::MaCrossover | StrategyType::EmaCrossover | StrategyType::MacdTrend => {
                StrategyFamily::TrendFollowing
            }
            StrategyType::RsiReversion | StrategyType::BollingerBreakout => {
                StrategyFamily::MeanReversion
            }
            StrategyType::Martingale => StrategyFamily::PositionAware,
            StrategyType::CorrelationArbitrage => StrategyFamily::CrossAsset,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyType::MaCrossover => "MA_CROSSOVER",
            StrategyType::EmaCrossover => "EMA_CROSSOVER",
            StrategyType::RsiReversion => "RSI_REVERSION",
            StrategyType::BollingerBreakout => "BOLLINGER_BREAKOUT",
            StrategyType::MacdTrend => "MACD_TREND",
            StrategyType::Martingale => "MARTINGALE",
            StrategyType::CorrelationArbitrage => "CORRELATION_ARBITRAGE",
        }
    }
}

impl std::fmt::Display for StrategyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown strategy type '{s}'"))
    }
}

/// One labeled diagnostic value reported by an evaluator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: f64,
}

/// Raw decision of one evaluator plus its diagnostics.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StrategyOutcome {
    pub signal: Signal,
    pub metrics: Vec<Metric>,
}

impl StrategyOutcome {
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn new(signal: Signal) -> Self {
        Self {
            signal,
            metrics: Vec::new(),
        }
    }

    pub fn metric(mut self, label: &'static str, value: f64) -> Self {
        self.metrics.push(Metric { label, value });
        self
    }
}

/// Read-only inputs for a single evaluation.
pub struct StrategyContext<'a> {
    /// Asset being evaluated; taken from the latest candle.
    pub asset: &'a str,
    pub candles: &'a [Candle],
    pub closes: Vec<f64>,
    pub open_positions: &'a [Position],
    pub all_assets: &'a AssetCandles,
    pub params: &'a StrategyParameters,
    pub regime: &'a MarketRegime,
}

impl<'a> StrategyContext<'a> {
    pub fn new(
        candles: &'a [Candle],
        open_positions: &'a [Position],
        all_assets: &'a AssetCandles,
        params: &'a StrategyParameters,
        regime: &'a MarketRegime,
    ) -> Self {
        Self {
            asset: candles.last().map(|c| c.asset.as_str()).unwrap_or_default(),
            candles,
            closes: closes(candles),
            open_positions,
            all_assets,
            params,
            regime,
        }
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }
}

pub type Evaluator = fn(&StrategyContext<'_>) -> StrategyOutcome;

/// Evaluate one strategy and return only its signal.
pub fn evaluate_strategy(
    strategy_type: StrategyType,
    candles: &[Candle],
    open_positions: &[Position],
    all_assets: &AssetCandles,
    params: &StrategyParameters,
) -> Signal {
    evaluate_strategy_detailed(strategy_type, candles, open_positions, all_assets, params).signal
}

/// Evaluate one strategy, classifying the regime from `candles` first.
pub fn evaluate_strategy_detailed(
    strategy_type: StrategyType,
    candles: &[Candle],
    open_positions: &[Position],
    all_assets: &AssetCandles,
    params: &StrategyParameters,
) -> StrategyOutcome {
    if candles.is_empty() {
        return StrategyOutcome::neutral();
    }
    let regime = classify_regime_with(&closes(candles), &params.regime);
    let ctx = StrategyContext::new(candles, open_positions, all_assets, params, &regime);
    (strategy_type.evaluator())(&ctx)
}
