use serde::Serialize;

use super::moving_average::ema_series;

/// Latest and previous readings of the MACD and signal lines.
///
/// All fields are zero when the series was too short.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MacdValues {
    pub macd: f64,
    pub signal: f64,
    pub prev_macd: f64,
    pub prev_signal: f64,
}

impl MacdValues {
    pub fn is_empty(&self) -> bool {
        self.macd == 0.0 && self.signal == 0.0
    }

    pub fn histogram(&self) -> f64 {
        self.macd - self.signal
    }

    /// MACD line moved from at-or-below the signal line to above it.
    pub fn crossed_up(&self) -> bool {
        self.prev_macd <= self.prev_signal && self.macd > self.signal
    }

    /// MACD line moved from at-or-above the signal line to below it.
    pub fn crossed_down(&self) -> bool {
        self.prev_macd >= self.prev_signal && self.macd < self.signal
    }
}

/// MACD line = EMA(fast) − EMA(slow) per index, signal line = EMA(signal) of
/// the MACD line. Needs at least `slow + signal` closes.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdValues {
    if closes.len() < slow + signal || closes.len() < 2 {
        return MacdValues::default();
    }

    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_series(&macd_line, signal);

    let n = macd_line.len();
    MacdValues {
        macd: macd_line[n - 1],
        signal: signal_line[n - 1],
        prev_macd: macd_line[n - 2],
        prev_signal: signal_line[n - 2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending_up(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64 * 0.5).collect()
    }

    #[test]
    fn macd_is_zero_with_insufficient_data() {
        let prices = vec![100.0; 30]; // need >= 35
        assert_eq!(macd(&prices, 12, 26, 9), MacdValues::default());
    }

    #[test]
    fn macd_positive_on_uptrend() {
        let values = macd(&trending_up(60), 12, 26, 9);
        assert!(values.macd > 0.0);
        assert!(!values.is_empty());
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let values = macd(&[100.0; 60], 12, 26, 9);
        assert!(values.is_empty());
        assert!(!values.crossed_up());
        assert!(!values.crossed_down());
    }

    #[test]
    fn macd_detects_bullish_crossover_after_reversal() {
        // Down then sharply up: somewhere along the way the MACD line must
        // cross above its signal line.
        let mut prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64 * 0.5).collect();
        prices.extend((0..20).map(|i| 90.0 + i as f64 * 2.0));
        let crossed = (6..=prices.len()).any(|end| macd(&prices[..end], 3, 6, 3).crossed_up());
        assert!(crossed);
    }
}
