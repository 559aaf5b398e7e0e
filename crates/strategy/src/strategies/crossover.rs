use common::Signal;

use crate::indicators::{ema_series, sma};

use super::{StrategyContext, StrategyOutcome};

/// Extra bars the SMA crossover needs beyond the slow period for its slope.
const SLOPE_LOOKBACK: usize = 3;
/// Minimum fast-SMA slope over the lookback, as a fraction of price.
const FAST_SLOPE_MIN: f64 = 0.0001;
/// How far the slow SMA may lean against the cross, as a fraction of price.
const SLOW_SLOPE_TOLERANCE: f64 = 0.0005;

/// SMA crossover gated by slope so that crosses inside a flat, choppy tape
/// are ignored. Needs `slow_period + 5` candles.
pub fn ma_crossover(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let p = ctx.params;
    let closes = &ctx.closes;
    if p.fast_period == 0 || closes.len() < p.slow_period + 5 {
        return StrategyOutcome::neutral();
    }

    let n = closes.len();
    let prev = &closes[..n - 1];
    let back = &closes[..n - SLOPE_LOOKBACK];

    let fast = sma(closes, p.fast_period);
    let slow = sma(closes, p.slow_period);
    let prev_fast = sma(prev, p.fast_period);
    let prev_slow = sma(prev, p.slow_period);

    let fast_slope = fast - sma(back, p.fast_period);
    let slow_slope = slow - sma(back, p.slow_period);

    let price = closes[n - 1];
    let fast_min = price * FAST_SLOPE_MIN;
    let slow_tolerance = price * SLOW_SLOPE_TOLERANCE;

    let golden_cross = prev_fast <= prev_slow && fast > slow;
    let death_cross = prev_fast >= prev_slow && fast < slow;

    let signal = if golden_cross && fast_slope > fast_min && slow_slope > -slow_tolerance {
        Signal::Buy
    } else if death_cross && fast_slope < -fast_min && slow_slope < slow_tolerance {
        Signal::Sell
    } else {
        Signal::Neutral
    };

    StrategyOutcome::new(signal)
        .metric("fast_sma", fast)
        .metric("slow_sma", slow)
        .metric("fast_slope", fast_slope)
        .metric("slow_slope", slow_slope)
}

/// EMA crossover on the last two bars, no slope filter.
/// Needs `slow_period + 1` candles.
pub fn ema_crossover(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let p = ctx.params;
    let closes = &ctx.closes;
    if closes.len() < p.slow_period + 1 || closes.len() < 2 {
        return StrategyOutcome::neutral();
    }

    let fast = ema_series(closes, p.fast_period);
    let slow = ema_series(closes, p.slow_period);
    let n = closes.len();
    let (fast_now, slow_now) = (fast[n - 1], slow[n - 1]);
    let (fast_prev, slow_prev) = (fast[n - 2], slow[n - 2]);

    let signal = if fast_prev <= slow_prev && fast_now > slow_now {
        Signal::Buy
    } else if fast_prev >= slow_prev && fast_now < slow_now {
        Signal::Sell
    } else {
        Signal::Neutral
    };

    StrategyOutcome::new(signal)
        .metric("fast_ema", fast_now)
        .metric("slow_ema", slow_now)
}
