use common::Signal;

use crate::indicators::macd;

use super::{StrategyContext, StrategyOutcome};

/// Trade MACD/signal line crossovers.
pub fn macd_trend(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let p = ctx.params;
    let values = macd(&ctx.closes, p.macd_fast, p.macd_slow, p.macd_signal);
    if values.is_empty() {
        return StrategyOutcome::neutral();
    }

    let signal = if values.crossed_up() {
        Signal::Buy
    } else if values.crossed_down() {
        Signal::Sell
    } else {
        Signal::Neutral
    };

    StrategyOutcome::new(signal)
        .metric("macd", values.macd)
        .metric("signal", values.signal)
        .metric("histogram", values.histogram())
}
