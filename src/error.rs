use chrono::NaiveDate;
use thiserror::Error;

/// Failure raised by an indicator's `calculate`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("Not enough data to calculate {indicator}: need at least {required} quotes, got {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Invalid value {value:?} for parameter '{param}' of {indicator}")]
    InvalidParameter {
        indicator: &'static str,
        param: String,
        value: String,
    },
}

impl IndicatorError {
    /// Name of the indicator that raised the error.
    pub fn indicator(&self) -> &'static str {
        match self {
            IndicatorError::InsufficientData { indicator, .. } => indicator,
            IndicatorError::InvalidParameter { indicator, .. } => indicator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("Quote at index {index} ({date}) does not follow {previous}; dates must be strictly increasing")]
    Unordered {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },
}

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("No market data available for {symbol} in the specified period.")]
    NoData { symbol: String },

    #[error("Failed to read market data for {symbol}")]
    Io {
        symbol: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed market data for {symbol}")]
    Parse {
        symbol: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Missing required parameter: symbol")]
    MissingSymbol,

    #[error("Invalid date for parameter '{param}': {value}")]
    InvalidDate { param: &'static str, value: String },

    #[error("Lookback of {days} days from {today} is out of range")]
    InvalidLookback { days: i64, today: NaiveDate },
}
