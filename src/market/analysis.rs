//! Technical and risk analysis over closing-price series
//!
//! All functions are pure and operate on plain slices. Statistics use
//! the sample form (n - 1 denominator), matching how daily return
//! series are conventionally annualized.

use serde::Serialize;

/// Trading days used to annualize daily statistics
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;

/// Simple daily returns of a close series
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation, `None` below two samples
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - center).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

fn covariance(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    Some(sum / (a.len() - 1) as f64)
}

/// Annualized volatility of a daily return series
pub fn annualized_volatility(returns: &[f64]) -> Option<f64> {
    Some(std_dev(returns)? * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Annualized Sharpe ratio at a zero risk-free rate
pub fn sharpe_ratio(returns: &[f64]) -> Option<f64> {
    let deviation = std_dev(returns)?;
    if deviation == 0.0 {
        return None;
    }
    Some((mean(returns) * TRADING_DAYS_PER_YEAR) / (deviation * TRADING_DAYS_PER_YEAR.sqrt()))
}

/// Pearson correlation of two equally long series
pub fn correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    let cov = covariance(a, b)?;
    let std_a = std_dev(a)?;
    let std_b = std_dev(b)?;
    if std_a == 0.0 || std_b == 0.0 {
        return None;
    }
    Some(cov / (std_a * std_b))
}

/// Beta of an asset's returns against a benchmark's returns
pub fn beta(asset_returns: &[f64], benchmark_returns: &[f64]) -> Option<f64> {
    let cov = covariance(asset_returns, benchmark_returns)?;
    let benchmark_variance = covariance(benchmark_returns, benchmark_returns)?;
    if benchmark_variance == 0.0 {
        return None;
    }
    Some(cov / benchmark_variance)
}

/// Relative strength index with Wilder smoothing
pub fn rsi(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window + 1 {
        return None;
    }
    let deltas: Vec<f64> = closes.windows(2).map(|pair| pair[1] - pair[0]).collect();
    let (seed, rest) = deltas.split_at(window);
    let mut avg_gain = seed.iter().filter(|d| **d > 0.0).sum::<f64>() / window as f64;
    let mut avg_loss = seed.iter().filter(|d| **d < 0.0).map(|d| -d).sum::<f64>() / window as f64;
    for delta in rest {
        avg_gain = (avg_gain * (window as f64 - 1.0) + delta.max(0.0)) / window as f64;
        avg_loss = (avg_loss * (window as f64 - 1.0) + (-delta).max(0.0)) / window as f64;
    }

    if avg_loss == 0.0 {
        // A lossless series saturates the index
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD line, signal line and histogram at the latest close
#[derive(Debug, Clone, Serialize)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD with the standard 12/26/9 spans
pub fn macd(closes: &[f64]) -> Option<Macd> {
    if closes.len() < MACD_SLOW {
        return None;
    }
    let fast = ema(closes, MACD_FAST);
    let slow = ema(closes, MACD_SLOW);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal_line = ema(&line, MACD_SIGNAL);

    let macd_value = *line.last()?;
    let signal_value = *signal_line.last()?;
    Some(Macd {
        macd: macd_value,
        signal: signal_value,
        histogram: macd_value - signal_value,
    })
}

/// Exponential moving average seeded with the first value
fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut current = match values.first() {
        Some(first) => *first,
        None => return out,
    };
    out.push(current);
    for value in &values[1..] {
        current = alpha * value + (1.0 - alpha) * current;
        out.push(current);
    }
    out
}

/// Bollinger bands at the latest close
#[derive(Debug, Clone, Serialize)]
pub struct Bollinger {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger bands over the trailing `window` closes
pub fn bollinger(closes: &[f64], window: usize, num_std: f64) -> Option<Bollinger> {
    if window < 2 || closes.len() < window {
        return None;
    }
    let recent = &closes[closes.len() - window..];
    let middle = mean(recent);
    let deviation = std_dev(recent)?;
    Some(Bollinger {
        upper: middle + num_std * deviation,
        middle,
        lower: middle - num_std * deviation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_daily_returns() {
        let returns = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert_close(returns[0], 0.1);
        assert_close(returns[1], -0.1);
    }

    #[test]
    fn test_std_dev_needs_two_samples() {
        assert!(std_dev(&[1.0]).is_none());
        assert_close(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap(), 2.138089935299395);
    }

    #[test]
    fn test_rsi_saturates_on_climb() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + f64::from(i)).collect();
        assert_close(rsi(&closes, 14).unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_floors_on_decline() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - f64::from(i)).collect();
        assert_close(rsi(&closes, 14).unwrap(), 0.0);
    }

    #[test]
    fn test_rsi_smooths_mixed_moves() {
        // Seed averages gains 2/3 and losses 1/3, one smoothing step
        // on a +1 change lands at 700/9
        let closes = [10.0, 11.0, 12.0, 11.0, 12.0];
        assert_close(rsi(&closes, 3).unwrap(), 700.0 / 9.0);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert!(rsi(&[100.0, 101.0], 14).is_none());
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + f64::from(i) * 0.5).collect();
        let result = macd(&closes).unwrap();
        assert!(result.macd > 0.0);
        assert!(result.histogram > 0.0);
    }

    #[test]
    fn test_macd_insufficient_data() {
        let closes: Vec<f64> = (0..10).map(f64::from).collect();
        assert!(macd(&closes).is_none());
    }

    #[test]
    fn test_bollinger_constant_series_collapses() {
        let closes = vec![50.0; 30];
        let bands = bollinger(&closes, 20, 2.0).unwrap();
        assert_close(bands.upper, 50.0);
        assert_close(bands.middle, 50.0);
        assert_close(bands.lower, 50.0);
    }

    #[test]
    fn test_bollinger_bands_bracket_mean() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + f64::from(i % 5)).collect();
        let bands = bollinger(&closes, 20, 2.0).unwrap();
        assert!(bands.lower < bands.middle);
        assert!(bands.middle < bands.upper);
    }

    #[test]
    fn test_correlation_of_self_is_one() {
        let series = vec![0.01, -0.02, 0.03, 0.01, -0.01];
        assert_close(correlation(&series, &series).unwrap(), 1.0);
    }

    #[test]
    fn test_correlation_of_inverse_is_minus_one() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![4.0, 3.0, 2.0, 1.0];
        assert_close(correlation(&a, &b).unwrap(), -1.0);
    }

    #[test]
    fn test_correlation_rejects_flat_series() {
        let flat = vec![1.0, 1.0, 1.0];
        let moving = vec![1.0, 2.0, 3.0];
        assert!(correlation(&flat, &moving).is_none());
    }

    #[test]
    fn test_beta_against_self_is_one() {
        let returns = vec![0.01, -0.02, 0.015, 0.005, -0.01];
        assert_close(beta(&returns, &returns).unwrap(), 1.0);
    }

    #[test]
    fn test_beta_scales_with_amplitude() {
        let benchmark = vec![0.01, -0.02, 0.015, 0.005, -0.01];
        let doubled: Vec<f64> = benchmark.iter().map(|r| r * 2.0).collect();
        assert_close(beta(&doubled, &benchmark).unwrap(), 2.0);
    }

    #[test]
    fn test_volatility_of_constant_prices_is_zero() {
        let returns = daily_returns(&[100.0; 10]);
        assert_close(annualized_volatility(&returns).unwrap(), 0.0);
    }

    #[test]
    fn test_sharpe_rejects_zero_deviation() {
        assert!(sharpe_ratio(&[0.01, 0.01, 0.01]).is_none());
        assert!(sharpe_ratio(&[0.01, 0.02, -0.01, 0.03]).is_some());
    }
}
