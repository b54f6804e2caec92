pub mod cli;
pub mod config;
pub mod error;
pub mod indicators;
pub mod market;
pub mod processor;
pub mod utils;

pub use crate::error::{IndicatorError, MarketDataError, RequestError, SeriesError};
pub use crate::indicators::{Indicator, IndicatorConfig, IndicatorOverrides, IndicatorRegistry};
pub use crate::market::{PriceSeries, Quote};
pub use crate::processor::{evaluate, IndicatorRecord, TechnicalRequest, TechnicalsService};
