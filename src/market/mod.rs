pub mod models;
pub mod provider;

pub use self::models::{PriceSeries, Quote};
pub use self::provider::{InMemoryProvider, JsonFileProvider, MarketDataProvider};
