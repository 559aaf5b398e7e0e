//! Regime-conditioned auto-tuning of strategy weights.
//!
//! Rules are multiplicative and applied in a fixed order, so they compound:
//! 1. trend-following: ×1.5 in any trending regime, ×0.5 when ranging
//! 2. mean-reversion: ×1.5 when ranging, ×0.5 when trend strength > 70
//! 3. MA crossover: ×0.7 when volatile

use tracing::debug;

use crate::regime::{MarketRegime, RegimeType};
use crate::strategies::{StrategyFamily, StrategyType};

const BOOST: f64 = 1.5;
const DAMPEN: f64 = 0.5;
const VOLATILE_MA_DAMPEN: f64 = 0.7;
/// Trend strength above which mean reversion is fighting the tape.
const STRONG_TREND: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightAdjustment {
    pub weight: f64,
    /// Human-readable summary of the rules that fired; `None` if none did.
    pub note: Option<String>,
}

pub fn adjust_weight(
    base_weight: f64,
    strategy_type: StrategyType,
    regime: &MarketRegime,
) -> WeightAdjustment {
    let base = base_weight.max(0.0);
    let mut weight = base;
    let mut notes: Vec<String> = Vec::new();

    match strategy_type.family() {
        StrategyFamily::TrendFollowing => {
            if regime.regime.is_trending() {
                weight *= BOOST;
                notes.push(format!("boosted ×{BOOST} for {}", regime.regime));
            } else if regime.regime == RegimeType::Ranging {
                weight *= DAMPEN;
                notes.push(format!("dampened ×{DAMPEN} in ranging market"));
            }
        }
        StrategyFamily::MeanReversion => {
            if regime.regime == RegimeType::Ranging {
                weight *= BOOST;
                notes.push(format!("boosted ×{BOOST} in ranging market"));
            }
            if regime.trend_score > STRONG_TREND {
                weight *= DAMPEN;
                notes.push(format!(
                    "dampened ×{DAMPEN}: trend strength {:.0} against reversion",
                    regime.trend_score
                ));
            }
        }
        StrategyFamily::PositionAware | StrategyFamily::CrossAsset => {}
    }

    if regime.regime == RegimeType::Volatile && strategy_type == StrategyType::MaCrossover {
        weight *= VOLATILE_MA_DAMPEN;
        notes.push(format!(
            "dampened ×{VOLATILE_MA_DAMPEN}: lagging signal in volatile market"
        ));
    }

    if notes.is_empty() {
        return WeightAdjustment { weight: base, note: None };
    }

    let weight = (weight * 100.0).round() / 100.0;
    let note = notes.join("; ");
    debug!(strategy = %strategy_type, base, weight, note = %note, "Strategy weight auto-tuned");
    WeightAdjustment { weight, note: Some(note) }
}
