//! Market regime classification for a single asset.
//!
//! Two scores feed the decision: a volatility score built from recent
//! period-over-period returns and a trend-strength score built from the gap
//! between a short and a long SMA. Both land on a 0–100 scale.

use serde::{Deserialize, Serialize};

use crate::indicators::{sma, std_dev};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegimeType {
    TrendingUp,
    TrendingDown,
    Ranging,
    Volatile,
}

impl RegimeType {
    pub fn is_trending(self) -> bool {
        matches!(self, RegimeType::TrendingUp | RegimeType::TrendingDown)
    }

    pub fn label(self) -> &'static str {
        match self {
            RegimeType::TrendingUp => "Uptrend: short-term average leads the long-term average",
            RegimeType::TrendingDown => "Downtrend: short-term average trails the long-term average",
            RegimeType::Ranging => "Range-bound: no dominant direction, low volatility",
            RegimeType::Volatile => "High volatility: large swings in both directions",
        }
    }
}

impl std::fmt::Display for RegimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RegimeType::TrendingUp => "TRENDING_UP",
            RegimeType::TrendingDown => "TRENDING_DOWN",
            RegimeType::Ranging => "RANGING",
            RegimeType::Volatile => "VOLATILE",
        };
        f.write_str(s)
    }
}

/// Classification of the current market state. Recomputed on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRegime {
    pub regime: RegimeType,
    /// 0–100.
    pub volatility_score: f64,
    /// 0–100.
    pub trend_score: f64,
    pub description: String,
}

impl MarketRegime {
    fn insufficient() -> Self {
        Self {
            regime: RegimeType::Ranging,
            volatility_score: 0.0,
            trend_score: 0.0,
            description: "Insufficient data for regime detection".to_string(),
        }
    }
}

/// Normalization constants for the regime scores.
///
/// The scale factors were picked empirically for crypto candles; they are
/// tuning knobs, not derived quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeTuning {
    /// Fewer closes than this yields RANGING with zero scores.
    pub min_closes: usize,
    /// Number of trailing returns in the volatility estimate.
    pub return_window: usize,
    pub short_period: usize,
    pub long_period: usize,
    /// Multiplies the √window-scaled fractional return volatility.
    pub volatility_scale: f64,
    /// Multiplies the short/long SMA gap expressed in percent.
    pub trend_scale: f64,
    pub score_cap: f64,
    pub volatile_threshold: f64,
    pub trend_threshold: f64,
}

impl Default for RegimeTuning {
    fn default() -> Self {
        Self {
            min_closes: 30,
            return_window: 20,
            short_period: 7,
            long_period: 25,
            volatility_scale: 1000.0,
            trend_scale: 20.0,
            score_cap: 100.0,
            volatile_threshold: 60.0,
            trend_threshold: 20.0,
        }
    }
}

/// Classify with the default tuning constants.
pub fn classify_regime(closes: &[f64]) -> MarketRegime {
    classify_regime_with(closes, &RegimeTuning::default())
}

pub fn classify_regime_with(closes: &[f64], tuning: &RegimeTuning) -> MarketRegime {
    let needed = tuning
        .min_closes
        .max(tuning.return_window + 1)
        .max(tuning.long_period);
    if closes.len() < needed {
        return MarketRegime::insufficient();
    }

    let volatility_score = volatility_score(closes, tuning);

    let short = sma(closes, tuning.short_period);
    let long = sma(closes, tuning.long_period);
    let trend_score = if long > 0.0 {
        let gap_pct = (short - long).abs() / long * 100.0;
        (gap_pct * tuning.trend_scale).min(tuning.score_cap)
    } else {
        0.0
    };

    let regime = if volatility_score > tuning.volatile_threshold {
        RegimeType::Volatile
    } else if trend_score > tuning.trend_threshold {
        if short > long {
            RegimeType::TrendingUp
        } else {
            RegimeType::TrendingDown
        }
    } else {
        RegimeType::Ranging
    };

    MarketRegime {
        regime,
        volatility_score,
        trend_score,
        description: regime.label().to_string(),
    }
}

fn volatility_score(closes: &[f64], tuning: &RegimeTuning) -> f64 {
    let window = &closes[closes.len() - (tuning.return_window + 1)..];
    let returns: Vec<f64> = window
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();

    let scaled = std_dev(&returns) * (tuning.return_window as f64).sqrt();
    (scaled * tuning.volatility_scale).min(tuning.score_cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_market_is_ranging_with_zero_scores() {
        let regime = classify_regime(&[100.0; 30]);
        assert_eq!(regime.regime, RegimeType::Ranging);
        assert_eq!(regime.volatility_score, 0.0);
        assert_eq!(regime.trend_score, 0.0);
        assert_eq!(regime.description, RegimeType::Ranging.label());
    }

    #[test]
    fn short_history_reports_insufficient_data() {
        let regime = classify_regime(&[100.0; 29]);
        assert_eq!(regime.regime, RegimeType::Ranging);
        assert_eq!(regime.volatility_score, 0.0);
        assert!(regime.description.contains("Insufficient"));
    }

    #[test]
    fn steady_climb_is_trending_up() {
        // +0.5% per bar: low dispersion of returns, wide SMA gap.
        let closes: Vec<f64> = (0..40).map(|i| 100.0 * 1.005f64.powi(i)).collect();
        let regime = classify_regime(&closes);
        assert_eq!(regime.regime, RegimeType::TrendingUp);
        assert!(regime.trend_score > 20.0);
    }

    #[test]
    fn steady_decline_is_trending_down() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 * 0.995f64.powi(i)).collect();
        assert_eq!(classify_regime(&closes).regime, RegimeType::TrendingDown);
    }

    #[test]
    fn whipsaw_is_volatile() {
        let closes: Vec<f64> = (0..40)
            .map(|i| if i % 2 == 0 { 100.0 } else { 106.0 })
            .collect();
        let regime = classify_regime(&closes);
        assert_eq!(regime.regime, RegimeType::Volatile);
        assert_eq!(regime.volatility_score, 100.0);
    }

    #[test]
    fn custom_tuning_changes_thresholds() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 * 1.005f64.powi(i)).collect();
        let tuning = RegimeTuning {
            trend_threshold: 100.0,
            ..RegimeTuning::default()
        };
        assert_eq!(classify_regime_with(&closes, &tuning).regime, RegimeType::Ranging);
    }
}
