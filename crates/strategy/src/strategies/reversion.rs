use common::Signal;

use crate::indicators::{bollinger_bands, rsi};

use super::{StrategyContext, StrategyOutcome};

/// Buy oversold, sell overbought.
pub fn rsi_reversion(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let p = ctx.params;
    if ctx.closes.len() < p.rsi_period + 1 {
        return StrategyOutcome::neutral();
    }

    let value = rsi(&ctx.closes, p.rsi_period);
    let signal = if value < p.rsi_oversold {
        Signal::Buy
    } else if value > p.rsi_overbought {
        Signal::Sell
    } else {
        Signal::Neutral
    };

    StrategyOutcome::new(signal).metric("rsi", value)
}

/// Buy at or below the lower band, sell at or above the upper band.
/// A flat window collapses the bands onto the close, which reads as BUY.
pub fn bollinger_breakout(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let p = ctx.params;
    let bands = bollinger_bands(&ctx.closes, p.bollinger_period, p.bollinger_std_dev);
    let Some(close) = ctx.last_close() else {
        return StrategyOutcome::neutral();
    };
    if bands.is_degenerate() {
        return StrategyOutcome::neutral();
    }

    let signal = if close <= bands.lower {
        Signal::Buy
    } else if close >= bands.upper {
        Signal::Sell
    } else {
        Signal::Neutral
    };

    StrategyOutcome::new(signal)
        .metric("upper", bands.upper)
        .metric("middle", bands.middle)
        .metric("lower", bands.lower)
        .metric("close", close)
}
