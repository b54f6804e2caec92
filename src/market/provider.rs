use crate::error::MarketDataError;
use crate::market::models::{PriceSeries, Quote};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Source of daily price history for a symbol.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Quotes for `symbol` between `start` and `end` (both inclusive), in
    /// ascending date order.
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, MarketDataError>;
}

// Feeds occasionally publish days with missing fields
#[derive(Debug, Deserialize)]
struct RawQuote {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

impl RawQuote {
    fn complete(&self) -> Option<Quote> {
        Some(Quote {
            date: self.date,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume?,
        })
    }
}

/// Reads `<data_dir>/<SYMBOL>.json`, a JSON array of daily quotes.
pub struct JsonFileProvider {
    data_dir: PathBuf,
}

impl JsonFileProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", symbol.to_uppercase()))
    }
}

#[async_trait]
impl MarketDataProvider for JsonFileProvider {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, MarketDataError> {
        let path = self.path_for(symbol);
        debug!("Loading quotes for {} from {}", symbol, path.display());

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MarketDataError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            Err(source) => {
                return Err(MarketDataError::Io {
                    symbol: symbol.to_string(),
                    source,
                });
            }
        };

        let raw: Vec<RawQuote> =
            serde_json::from_str(&contents).map_err(|source| MarketDataError::Parse {
                symbol: symbol.to_string(),
                source,
            })?;

        let total = raw.len();
        let quotes: Vec<Quote> = raw.iter().filter_map(RawQuote::complete).collect();
        if quotes.len() < total {
            warn!(
                "Dropped {} incomplete quotes for {}",
                total - quotes.len(),
                symbol
            );
        }

        build_series(symbol, quotes, start, end)
    }
}

/// Serves quotes held in memory, keyed by upper-cased symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    quotes: HashMap<String, Vec<Quote>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, quotes: Vec<Quote>) {
        self.quotes.insert(symbol.to_uppercase(), quotes);
    }

    pub fn with(mut self, symbol: &str, quotes: Vec<Quote>) -> Self {
        self.insert(symbol, quotes);
        self
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryProvider {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, MarketDataError> {
        let quotes = self
            .quotes
            .get(&symbol.to_uppercase())
            .cloned()
            .unwrap_or_default();

        build_series(symbol, quotes, start, end)
    }
}

// Sort, keep the last row for a repeated date, clip to [start, end]
fn build_series(
    symbol: &str,
    mut quotes: Vec<Quote>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, MarketDataError> {
    quotes.retain(|q| q.date >= start && q.date <= end);
    quotes.sort_by_key(|q| q.date);

    let mut unique: Vec<Quote> = Vec::with_capacity(quotes.len());
    for quote in quotes {
        match unique.last_mut() {
            Some(last) if last.date == quote.date => *last = quote,
            _ => unique.push(quote),
        }
    }

    if unique.is_empty() {
        return Err(MarketDataError::NoData {
            symbol: symbol.to_string(),
        });
    }

    Ok(PriceSeries::new(symbol.to_uppercase(), unique)?)
}
