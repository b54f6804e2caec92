// Window kernels shared by the indicator implementations.
//
// Everything here is a pure function over slices. Outputs are aligned with
// their input: position `i` of the result describes input position `i`, and
// `None` marks positions without enough history.

use crate::market::Quote;

/// Arithmetic mean of each trailing `period` window.
///
/// Returns all `None` when `period` is zero or exceeds the input.
pub fn simple_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let sum: f64 = values[i + 1 - period..=i].iter().sum();
            Some(sum / period as f64)
        })
        .collect()
}

/// EMA seeded with the SMA of the first `period` values at index
/// `period - 1`, then `ema = (value - ema) * 2/(period+1) + ema`.
pub fn exponential_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut results = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return results;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    results[period - 1] = Some(ema);

    for i in period..values.len() {
        ema = (values[i] - ema) * multiplier + ema;
        results[i] = Some(ema);
    }

    results
}

/// Population standard deviation of `window` around `mean` (divisor = len).
pub fn population_std_dev(window: &[f64], mean: f64) -> f64 {
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window.len() as f64;
    variance.sqrt()
}

/// Mean absolute deviation of `window` around `mean`.
pub fn mean_deviation(window: &[f64], mean: f64) -> f64 {
    window.iter().map(|v| (v - mean).abs()).sum::<f64>() / window.len() as f64
}

pub fn highest_high(window: &[Quote]) -> f64 {
    window.iter().map(|q| q.high).fold(f64::NEG_INFINITY, f64::max)
}

pub fn lowest_low(window: &[Quote]) -> f64 {
    window.iter().map(|q| q.low).fold(f64::INFINITY, f64::min)
}

/// Midpoint of the window's high/low range.
pub fn high_low_midpoint(window: &[Quote]) -> f64 {
    (highest_high(window) + lowest_low(window)) / 2.0
}

/// `(high + low + close) / 3`
pub fn typical_price(quote: &Quote) -> f64 {
    (quote.high + quote.low + quote.close) / 3.0
}

/// Where the close sits in the day's range, in [-1, 1]; 0 for a flat day.
pub fn money_flow_multiplier(quote: &Quote) -> f64 {
    let range = quote.high - quote.low;
    if range == 0.0 {
        return 0.0;
    }
    (quote.close - quote.low - (quote.high - quote.close)) / range
}

pub fn money_flow_volume(quote: &Quote) -> f64 {
    money_flow_multiplier(quote) * quote.volume
}

/// `max(H - L, |H - prev_close|, |L - prev_close|)`
pub fn true_range(quote: &Quote, prev_close: f64) -> f64 {
    let high_low = quote.high - quote.low;
    let high_prev_close = (quote.high - prev_close).abs();
    let low_prev_close = (quote.low - prev_close).abs();
    high_low.max(high_prev_close).max(low_prev_close)
}

/// Raw stochastic %K of `close` against the window's range.
pub fn stochastic_k(window: &[Quote], close: f64) -> f64 {
    let highest = highest_high(window);
    let lowest = lowest_low(window);
    ((close - lowest) / (highest - lowest)) * 100.0
}
