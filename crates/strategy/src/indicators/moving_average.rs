/// Arithmetic mean of the last `period` values.
/// Returns 0 when `data` holds fewer than `period` values.
pub fn sma(data: &[f64], period: usize) -> f64 {
    if period == 0 || data.len() < period {
        return 0.0;
    }
    data[data.len() - period..].iter().sum::<f64>() / period as f64
}

/// Exponential moving average, one value per input index.
///
/// Seeded with the first raw value rather than an SMA of the first `period`
/// values, so early indices lean towards the first price. Multiplier is
/// `k = 2 / (period + 1)`.
pub fn ema_series(data: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = data.first() else {
        return Vec::new();
    };
    let k = 2.0 / (period as f64 + 1.0);

    let mut out = Vec::with_capacity(data.len());
    out.push(first);
    for &price in &data[1..] {
        let prev = out[out.len() - 1];
        out.push(price * k + prev * (1.0 - k));
    }
    out
}

/// Population standard deviation (divides by n).
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_uses_last_period_values() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((sma(&data, 2) - 4.5).abs() < 1e-12);
        assert!((sma(&data, 5) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn sma_returns_zero_when_short() {
        assert_eq!(sma(&[1.0, 2.0], 3), 0.0);
        assert_eq!(sma(&[1.0, 2.0], 0), 0.0);
    }

    #[test]
    fn ema_is_seeded_with_first_value() {
        let series = ema_series(&[10.0, 20.0], 3);
        // k = 0.5
        assert_eq!(series, vec![10.0, 15.0]);
    }

    #[test]
    fn ema_empty_input_is_empty() {
        assert!(ema_series(&[], 5).is_empty());
    }

    #[test]
    fn ema_constant_series_stays_constant() {
        let series = ema_series(&[42.0; 30], 9);
        assert_eq!(series.len(), 30);
        assert!(series.iter().all(|v| (v - 42.0).abs() < 1e-9));
    }

    #[test]
    fn std_dev_is_population() {
        // mean 5, squared deviations sum 32, n = 8
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&data) - 2.0).abs() < 1e-12);
        assert_eq!(std_dev(&[]), 0.0);
    }
}
