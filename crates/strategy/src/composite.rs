//! Weighted-vote aggregation of every enabled strategy into one decision.

use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{Candle, Position, Signal};

use crate::indicators::closes;
use crate::params::StrategyParameters;
use crate::regime::{classify_regime_with, MarketRegime};
use crate::strategies::{AssetCandles, Metric, StrategyContext, StrategyType};
use crate::tuning::adjust_weight;

/// Normalized score above which the composite says BUY (below the negative, SELL).
pub const DECISION_THRESHOLD: f64 = 0.25;

/// Base weight bounds accepted by configuration validation.
pub const MIN_WEIGHT: f64 = 1.0;
pub const MAX_WEIGHT: f64 = 10.0;

/// One entry of the active strategy mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfigItem {
    #[serde(rename = "type")]
    pub strategy_type: StrategyType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub weight: f64,
}

fn default_enabled() -> bool {
    true
}

impl StrategyConfigItem {
    pub fn new(strategy_type: StrategyType, weight: f64) -> Self {
        Self {
            strategy_type,
            enabled: true,
            weight,
        }
    }
}

/// Per-strategy breakdown of a composite evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyInsight {
    pub strategy_type: StrategyType,
    pub signal: Signal,
    pub base_weight: f64,
    pub adjusted_weight: f64,
    /// Contribution to the weighted sum: vote × adjusted weight.
    pub score: f64,
    pub metrics: Vec<Metric>,
    pub tuning_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeAnalysisResult {
    pub asset: String,
    pub signal: Signal,
    /// Normalized into [-1, 1].
    pub score: f64,
    pub regime: MarketRegime,
    pub insights: Vec<StrategyInsight>,
}

/// Run the full pipeline for the asset of `candles`.
///
/// Insights follow the order of `strategy_configs`; disabled entries are
/// skipped entirely.
pub fn evaluate_composite(
    strategy_configs: &[StrategyConfigItem],
    candles: &[Candle],
    open_positions: &[Position],
    all_assets: &AssetCandles,
    params: &StrategyParameters,
) -> CompositeAnalysisResult {
    let regime = classify_regime_with(&closes(candles), &params.regime);
    let ctx = StrategyContext::new(candles, open_positions, all_assets, params, &regime);

    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    let mut insights = Vec::new();

    for item in strategy_configs.iter().filter(|item| item.enabled) {
        let outcome = if candles.is_empty() {
            Default::default()
        } else {
            (item.strategy_type.evaluator())(&ctx)
        };
        let adjustment = adjust_weight(item.weight, item.strategy_type, &regime);
        let contribution = outcome.signal.vote() * adjustment.weight;

        weighted += contribution;
        total_weight += adjustment.weight;

        debug!(
            asset = %ctx.asset,
            strategy = %item.strategy_type,
            signal = %outcome.signal,
            weight = adjustment.weight,
            "Strategy evaluated"
        );

        insights.push(StrategyInsight {
            strategy_type: item.strategy_type,
            signal: outcome.signal,
            base_weight: item.weight,
            adjusted_weight: adjustment.weight,
            score: contribution,
            metrics: outcome.metrics,
            tuning_note: adjustment.note,
        });
    }

    let score = if total_weight > 0.0 {
        (weighted / total_weight).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let signal = if score > DECISION_THRESHOLD {
        Signal::Buy
    } else if score < -DECISION_THRESHOLD {
        Signal::Sell
    } else {
        Signal::Neutral
    };

    CompositeAnalysisResult {
        asset: ctx.asset.to_string(),
        signal,
        score,
        regime,
        insights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::RegimeType;
    use crate::strategies::test_support::series;

    fn flat(n: usize) -> Vec<Candle> {
        series("ETHUSDT", &vec![100.0; n])
    }

    #[test]
    fn no_enabled_strategies_is_neutral_zero() {
        let mut disabled = StrategyConfigItem::new(StrategyType::RsiReversion, 5.0);
        disabled.enabled = false;
        let result = evaluate_composite(
            &[disabled],
            &flat(40),
            &[],
            &AssetCandles::new(),
            &StrategyParameters::default(),
        );
        assert_eq!(result.signal, Signal::Neutral);
        assert_eq!(result.score, 0.0);
        assert!(result.insights.is_empty());
    }

    #[test]
    fn empty_config_is_neutral_zero() {
        let result = evaluate_composite(
            &[],
            &flat(40),
            &[],
            &AssetCandles::new(),
            &StrategyParameters::default(),
        );
        assert_eq!(result.signal, Signal::Neutral);
        assert_eq!(result.score, 0.0);
        assert!(result.insights.is_empty());
        assert_eq!(result.regime.regime, RegimeType::Ranging);
    }

    #[test]
    fn unanimous_buy_scores_one() {
        // Steady decline: RSI 0, martingale entry fires too.
        let closes: Vec<f64> = (0..40).map(|i| 200.0 - i as f64 * 0.1).collect();
        let candles = series("ETHUSDT", &closes);
        let configs = [
            StrategyConfigItem::new(StrategyType::RsiReversion, 3.0),
            StrategyConfigItem::new(StrategyType::Martingale, 2.0),
        ];
        let result = evaluate_composite(
            &configs,
            &candles,
            &[],
            &AssetCandles::new(),
            &StrategyParameters::default(),
        );
        assert_eq!(result.signal, Signal::Buy);
        assert!((result.score - 1.0).abs() < 1e-12);
        assert_eq!(result.insights.len(), 2);
        assert!(result.insights.iter().all(|i| i.signal == Signal::Buy));
    }

    #[test]
    fn weak_consensus_stays_neutral() {
        // RSI buys (weight 1); MACD and EMA stay neutral on a steady trend.
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64 * 0.1).collect();
        let candles = series("ETHUSDT", &closes);
        let configs = [
            StrategyConfigItem::new(StrategyType::RsiReversion, 1.0),
            StrategyConfigItem::new(StrategyType::EmaCrossover, 10.0),
            StrategyConfigItem::new(StrategyType::MacdTrend, 10.0),
        ];
        let result = evaluate_composite(
            &configs,
            &candles,
            &[],
            &AssetCandles::new(),
            &StrategyParameters::default(),
        );
        assert_eq!(result.insights[0].signal, Signal::Buy);
        assert_eq!(result.insights[1].signal, Signal::Neutral);
        assert_eq!(result.signal, Signal::Neutral);
        assert!(result.score > 0.0 && result.score <= DECISION_THRESHOLD);
    }

    #[test]
    fn insights_keep_config_order_and_carry_adjusted_weight() {
        let configs = [
            StrategyConfigItem::new(StrategyType::MacdTrend, 4.0),
            StrategyConfigItem::new(StrategyType::CorrelationArbitrage, 2.0),
            StrategyConfigItem::new(StrategyType::BollingerBreakout, 2.0),
        ];
        let result = evaluate_composite(
            &configs,
            &flat(40),
            &[],
            &AssetCandles::new(),
            &StrategyParameters::default(),
        );
        let order: Vec<StrategyType> = result.insights.iter().map(|i| i.strategy_type).collect();
        assert_eq!(
            order,
            vec![
                StrategyType::MacdTrend,
                StrategyType::CorrelationArbitrage,
                StrategyType::BollingerBreakout
            ]
        );
        // Ranging: trend follower halved, reversion boosted, arbitrage untouched.
        assert_eq!(result.insights[0].adjusted_weight, 2.0);
        assert_eq!(result.insights[1].adjusted_weight, 2.0);
        assert!(result.insights[1].tuning_note.is_none());
        assert_eq!(result.insights[2].adjusted_weight, 3.0);
    }

    #[test]
    fn empty_candles_degrade_to_neutral() {
        let configs = [StrategyConfigItem::new(StrategyType::RsiReversion, 3.0)];
        let result = evaluate_composite(
            &configs,
            &[],
            &[],
            &AssetCandles::new(),
            &StrategyParameters::default(),
        );
        assert_eq!(result.signal, Signal::Neutral);
        assert_eq!(result.insights.len(), 1);
        assert_eq!(result.insights[0].signal, Signal::Neutral);
    }
}
