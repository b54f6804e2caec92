use crate::error::SeriesError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// One trading-day sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Quote {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Date-ascending, duplicate-free sequence of quotes for one symbol.
///
/// Read-only once built: indicators only see its length, indexed quotes and
/// contiguous windows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    quotes: Vec<Quote>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, quotes: Vec<Quote>) -> Result<Self, SeriesError> {
        for (index, pair) in quotes.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::Unordered {
                    index: index + 1,
                    previous: pair[0].date,
                    date: pair[1].date,
                });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            quotes,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.quotes.get(index)
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.quotes.iter()
    }

    /// Contiguous sub-range by position.
    pub fn slice(&self, range: Range<usize>) -> &[Quote] {
        &self.quotes[range]
    }

    /// The `period` quotes ending at `end` (inclusive).
    ///
    /// Callers guarantee `end + 1 >= period`.
    pub fn window(&self, end: usize, period: usize) -> &[Quote] {
        self.slice(end + 1 - period..end + 1)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.quotes.iter().map(|q| q.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.quotes.iter().map(|q| q.volume).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.quotes.first().map(|q| q.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.quotes.last().map(|q| q.date)
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.quotes.iter()
    }
}
