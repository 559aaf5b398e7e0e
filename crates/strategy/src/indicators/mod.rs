//! Stateless indicator math over closing-price series (oldest first).
//!
//! Every function tolerates short input by returning a fixed sentinel
//! instead of failing: 0 for moving averages, 50 for RSI, an all-zero
//! band for Bollinger and all-zero lines for MACD.

pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;

pub use bollinger::{bollinger_bands, BollingerBands};
pub use macd::{macd, MacdValues};
pub use moving_average::{ema_series, sma, std_dev};
pub use rsi::rsi;

use common::Candle;

/// Closing prices of a candle slice, in order.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}
