use crate::error::IndicatorError;
use crate::indicators::{
    Indicator, IndicatorConfig, IndicatorOutput, IndicatorOverrides, IndicatorRegistry,
};
use crate::market::{PriceSeries, Quote};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// One output row: the day's quote plus every requested indicator value,
/// nested as indicator name -> series name -> value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(flatten)]
    pub indicators: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}

impl IndicatorRecord {
    fn from_quote(quote: &Quote) -> Self {
        Self {
            date: quote.date,
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
            indicators: BTreeMap::new(),
        }
    }

    /// `None` both when the key is absent and when the value is in warm-up.
    pub fn value(&self, indicator: &str, series: &str) -> Option<f64> {
        self.indicators.get(indicator)?.get(series).copied().flatten()
    }

    pub fn contains(&self, indicator: &str, series: &str) -> bool {
        self.indicators
            .get(indicator)
            .is_some_and(|values| values.contains_key(series))
    }

    /// Dotted `indicator.series` keys present on this record.
    pub fn keys(&self) -> Vec<String> {
        self.indicators
            .iter()
            .flat_map(|(indicator, values)| {
                values
                    .keys()
                    .map(move |series| format!("{}.{}", indicator, series))
            })
            .collect()
    }
}

/// Default config of `indicator` with `overrides` laid over it key by key.
pub fn resolve_config(
    indicator: &dyn Indicator,
    overrides: Option<&IndicatorConfig>,
) -> IndicatorConfig {
    let defaults = indicator.default_config();
    match overrides {
        Some(overrides) => defaults.merged(overrides),
        None => defaults,
    }
}

/// Runs every requested indicator over `series` and merges the outputs into
/// one record per quote.
///
/// Repeated names are computed once; names missing from the registry are
/// skipped. Any indicator failure fails the whole evaluation, reporting the
/// first failing indicator in request order.
pub fn evaluate<S: AsRef<str>>(
    registry: &IndicatorRegistry,
    series: &PriceSeries,
    names: &[S],
    overrides: &IndicatorOverrides,
) -> Result<Vec<IndicatorRecord>, IndicatorError> {
    let mut seen = HashSet::new();
    let requested: Vec<&dyn Indicator> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| seen.insert(*name))
        .filter_map(|name| {
            let indicator = registry.get(name);
            if indicator.is_none() {
                debug!("Skipping unknown indicator {}", name);
            }
            indicator
        })
        .collect();

    let computed: Vec<Result<(&'static str, IndicatorOutput), IndicatorError>> = requested
        .par_iter()
        .map(|indicator| {
            let config = resolve_config(*indicator, overrides.get(indicator.name()));
            debug!("Calculating {} with {:?}", indicator.name(), config);
            indicator
                .calculate(series, &config)
                .map(|output| (indicator.name(), output))
        })
        .collect();
    let outputs = computed.into_iter().collect::<Result<Vec<_>, _>>()?;

    let mut records: Vec<IndicatorRecord> = series.iter().map(IndicatorRecord::from_quote).collect();
    for (name, output) in outputs {
        for (series_name, values) in output {
            for (i, record) in records.iter_mut().enumerate() {
                record
                    .indicators
                    .entry(name.to_string())
                    .or_default()
                    .insert(series_name.to_string(), values.get(i).copied().flatten());
            }
        }
    }

    debug!(
        "Evaluated {} indicators over {} quotes for {}",
        requested.len(),
        records.len(),
        series.symbol()
    );
    Ok(records)
}
