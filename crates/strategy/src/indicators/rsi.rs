/// Default RSI lookback.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Neutral reading returned while history is too short.
pub const RSI_INSUFFICIENT: f64 = 50.0;

/// RSI (Relative Strength Index) over the last `period` close-to-close changes.
///
/// Plain sums of gains and losses, no Wilder smoothing. Returns 50 when fewer
/// than `period + 1` closes are available and 100 when the window holds no
/// losses at all.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return RSI_INSUFFICIENT;
    }

    let window = &closes[closes.len() - (period + 1)..];
    let (gains, losses) = window
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), change| {
            if change > 0.0 {
                (g + change, l)
            } else {
                (g, l - change)
            }
        });

    if losses == 0.0 {
        return 100.0;
    }

    let rs = gains / losses;
    100.0 - 100.0 / (1.0 + rs)
}
