#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use stock_technicals::{PriceSeries, Quote};

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

pub fn quotes_from_hlcv(rows: &[(f64, f64, f64, f64)]) -> Vec<Quote> {
    rows.iter()
        .enumerate()
        .map(|(i, &(high, low, close, volume))| {
            Quote::new(
                start_date() + Duration::days(i as i64),
                close,
                high,
                low,
                close,
                volume,
            )
        })
        .collect()
}

pub fn series_hlcv(rows: &[(f64, f64, f64, f64)]) -> PriceSeries {
    PriceSeries::new("TEST", quotes_from_hlcv(rows)).unwrap()
}

pub fn constant_series(len: usize, close: f64) -> PriceSeries {
    series_hlcv(&vec![(close, close, close, 1_000.0); len])
}

/// Deterministic random walk, seeded so every run sees the same prices.
pub fn random_walk(len: usize, seed: u64) -> PriceSeries {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let mut close = 100.0;
    let rows: Vec<_> = (0..len)
        .map(|_| {
            close = (close + (next() - 0.5) * 4.0).max(1.0);
            let high = close + next() * 2.0;
            let low = (close - next() * 2.0).max(0.5);
            // Round volume so some days repeat the previous close exactly
            let volume = (next() * 10_000.0).round();
            (high, low, close, volume)
        })
        .collect();
    series_hlcv(&rows)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
