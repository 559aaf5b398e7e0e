use serde::Serialize;

use super::moving_average::{sma, std_dev};

/// Volatility channel around a simple moving average.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    /// True for the all-zero band returned on short history.
    pub fn is_degenerate(&self) -> bool {
        self.upper == 0.0 && self.middle == 0.0 && self.lower == 0.0
    }
}

/// Middle = SMA(period); upper/lower = middle ± population stddev of the last
/// `period` closes × `multiplier`. All-zero when history is short.
pub fn bollinger_bands(closes: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    if period == 0 || closes.len() < period {
        return BollingerBands::default();
    }

    let middle = sma(closes, period);
    let width = std_dev(&closes[closes.len() - period..]) * multiplier;
    BollingerBands {
        upper: middle + width,
        middle,
        lower: middle - width,
    }
}
