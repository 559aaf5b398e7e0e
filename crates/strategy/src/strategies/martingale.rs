use common::{Position, PositionSide, Signal};

use crate::indicators::rsi;

use super::{StrategyContext, StrategyOutcome};

/// Initial entry fires this many RSI points above the oversold threshold.
const ENTRY_RSI_SLACK: f64 = 10.0;

/// Position-aware scale-in strategy.
///
/// With no open long lots on the asset it enters on a loosened RSI trigger.
/// With lots open it adds another lot after a large enough drop from the most
/// recent entry, and otherwise closes everything once price clears the
/// volume-weighted average entry by more than the profit target.
pub fn martingale(ctx: &StrategyContext<'_>) -> StrategyOutcome {
    let p = ctx.params;
    let Some(price) = ctx.last_close() else {
        return StrategyOutcome::neutral();
    };

    let lots: Vec<&Position> = ctx
        .open_positions
        .iter()
        .filter(|pos| pos.asset == ctx.asset && pos.is_open() && pos.side == PositionSide::Long)
        .collect();

    let Some(latest) = lots.iter().copied().max_by_key(|pos| pos.opened_at) else {
        if ctx.closes.len() < p.rsi_period + 1 {
            return StrategyOutcome::neutral();
        }
        let value = rsi(&ctx.closes, p.rsi_period);
        let signal = if value < p.rsi_oversold + ENTRY_RSI_SLACK {
            Signal::Buy
        } else {
            Signal::Neutral
        };
        return StrategyOutcome::new(signal)
            .metric("rsi", value)
            .metric("open_lots", 0.0);
    };

    let drop_pct = if latest.entry_price > 0.0 {
        (latest.entry_price - price) / latest.entry_price * 100.0
    } else {
        0.0
    };

    let average_entry = volume_weighted_entry(&lots);
    let gain_pct = if average_entry > 0.0 {
        (price - average_entry) / average_entry * 100.0
    } else {
        0.0
    };

    let signal = if drop_pct > p.martingale_price_drop_pct {
        Signal::Buy
    } else if average_entry > 0.0 && gain_pct > p.martingale_profit_target_pct {
        Signal::Sell
    } else {
        Signal::Neutral
    };

    StrategyOutcome::new(signal)
        .metric("open_lots", lots.len() as f64)
        .metric("drop_from_last_entry_pct", drop_pct)
        .metric("average_entry", average_entry)
        .metric("gain_over_average_pct", gain_pct)
        .metric(
            "next_lot_quantity",
            latest.quantity * p.martingale_volume_multiplier,
        )
}

/// Σ(price × qty) / Σqty over the open lots; 0 when total quantity is 0.
pub fn volume_weighted_entry(lots: &[&Position]) -> f64 {
    let quantity: f64 = lots.iter().map(|pos| pos.quantity).sum();
    if quantity <= 0.0 {
        return 0.0;
    }
    lots.iter().map(|pos| pos.entry_price * pos.quantity).sum::<f64>() / quantity
}
