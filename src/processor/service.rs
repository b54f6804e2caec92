use crate::indicators::{IndicatorMetadata, IndicatorRegistry};
use crate::market::MarketDataProvider;
use crate::processor::evaluator::{evaluate, IndicatorRecord};
use crate::processor::job::TechnicalRequest;
use crate::utils::measure_time;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, instrument};

/// Ties a market data source to an indicator registry: fetch the series,
/// run the requested indicators, hand back merged records.
#[derive(Clone)]
pub struct TechnicalsService {
    registry: Arc<IndicatorRegistry>,
    provider: Arc<dyn MarketDataProvider>,
}

impl TechnicalsService {
    pub fn new(registry: Arc<IndicatorRegistry>, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { registry, provider }
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    /// Metadata for every registered indicator, in registration order.
    pub fn catalog(&self) -> Vec<IndicatorMetadata> {
        self.registry.metadata()
    }

    /// Errors keep their typed source: callers can `downcast_ref` to
    /// `MarketDataError` or `IndicatorError`.
    #[instrument(skip(self, request), fields(symbol = %request.symbol))]
    pub async fn handle(&self, request: &TechnicalRequest) -> Result<Vec<IndicatorRecord>> {
        let series = self
            .provider
            .fetch(&request.symbol, request.start_date, request.end_date)
            .await
            .with_context(|| format!("Failed to fetch market data for {}", request.symbol))?;

        if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
            info!(
                "Fetched {} quotes for {} ({} to {})",
                series.len(),
                series.symbol(),
                first,
                last
            );
        }

        let registry = Arc::clone(&self.registry);
        let names = request.indicators.clone();
        let overrides = request.overrides.clone();

        // Indicator math is CPU-bound; keep it off the async workers
        let records = measure_time(&request.label(), async move {
            let records = tokio::task::spawn_blocking(move || {
                evaluate(&registry, &series, &names, &overrides)
            })
            .await
            .context("Indicator evaluation task failed")??;
            Ok::<_, anyhow::Error>(records)
        })
        .await?;

        info!(
            "Evaluated {} indicators into {} records",
            request.indicators.len(),
            records.len()
        );
        Ok(records)
    }
}
