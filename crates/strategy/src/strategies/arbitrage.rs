use common::Signal;

use crate::indicators::std_dev;

use super::{StrategyContext, StrategyOutcome};

/// Minimum reference history before the leader is trusted.
const MIN_REFERENCE_CANDLES: usize = 30;
/// Returns in the reference volatility estimate.
const VOLATILITY_WINDOW: usize = 20;
/// Bars in the leader/laggard return comparison.
const LOOKBACK: usize = 5;
/// Bars in the trailing volume average of the liquidity screen.
const VOLUME_WINDOW: usize = 20;
/// Latest volume must be at least this share of the trailing average.
const MIN_VOLUME_RATIO: f64 = 0.4;
/// Floor of the dynamic move threshold (0.35%).
const MIN_THRESHOLD: f64 = 0.0035;
const VOLATILITY_MULTIPLIER: f64 = 1.5;

/// Lead/lag trade against a reference asset.
///
/// When the reference moved decisively over the lookback and this asset has
/// covered less than half of that move, bet on the laggard catching up.
/// Illiquid bars are skipped: a lag caused by missing volume is not tradeable.
pub fn correlation_arbitrage(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let reference_asset = ctx.params.arbitrage_reference_asset.as_str();
    if ctx.asset == reference_asset {
        return StrategyOutcome::neutral();
    }
    let Some(reference) = ctx.all_assets.get(reference_asset) else {
        return StrategyOutcome::neutral();
    };
    if reference.len() < MIN_REFERENCE_CANDLES || ctx.candles.len() < VOLUME_WINDOW + 1 {
        return StrategyOutcome::neutral();
    }

    let n = ctx.candles.len();
    let latest_volume = ctx.candles[n - 1].volume;
    let average_volume = ctx.candles[n - 1 - VOLUME_WINDOW..n - 1]
        .iter()
        .map(|c| c.volume)
        .sum::<f64>()
        / VOLUME_WINDOW as f64;
    if average_volume <= 0.0 || latest_volume < average_volume * MIN_VOLUME_RATIO {
        return StrategyOutcome::neutral()
            .metric("volume_ratio", ratio(latest_volume, average_volume));
    }

    let reference_closes: Vec<f64> = reference.iter().map(|c| c.close).collect();
    let returns: Vec<f64> = reference_closes[reference_closes.len() - (VOLATILITY_WINDOW + 1)..]
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    let volatility = std_dev(&returns);
    let threshold =
        MIN_THRESHOLD.max(VOLATILITY_MULTIPLIER * volatility * (LOOKBACK as f64).sqrt());

    let reference_return = lookback_return(&reference_closes);
    let asset_return = lookback_return(&ctx.closes);

    let signal = if reference_return > threshold && asset_return < reference_return / 2.0 {
        Signal::Buy
    } else if reference_return < -threshold && asset_return > reference_return / 2.0 {
        Signal::Sell
    } else {
        Signal::Neutral
    };

    StrategyOutcome::new(signal)
        .metric("reference_return_pct", reference_return * 100.0)
        .metric("asset_return_pct", asset_return * 100.0)
        .metric("threshold_pct", threshold * 100.0)
        .metric("volume_ratio", ratio(latest_volume, average_volume))
}

/// Fractional change over the last `LOOKBACK` bars.
fn lookback_return(closes: &[f64]) -> f64 {
    if closes.len() < LOOKBACK + 1 {
        return 0.0;
    }
    let then = closes[closes.len() - 1 - LOOKBACK];
    let now = closes[closes.len() - 1];
    if then == 0.0 {
        return 0.0;
    }
    (now - then) / then
}

fn ratio(value: f64, base: f64) -> f64 {
    if base > 0.0 {
        value / base
    } else {
        0.0
    }
}
