pub mod config;
pub mod oscillators;
pub mod overlaps;
pub mod registry;
pub mod ta;
pub mod volatility;
pub mod volume;

use crate::error::IndicatorError;
use crate::market::PriceSeries;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use self::config::{ConfigValue, IndicatorConfig, IndicatorOverrides};
pub use self::oscillators::{
    CommodityChannelIndex, MovingAverageConvergenceDivergence, RelativeStrengthIndex,
    StochasticOscillator, WilliamsR,
};
pub use self::overlaps::{BollingerBands, ExponentialMovingAverage, IchimokuCloud, SimpleMovingAverage};
pub use self::registry::IndicatorRegistry;
pub use self::volatility::{AverageTrueRange, TrueRange};
pub use self::volume::{
    AccumulationDistributionLine, ChaikinMoneyFlow, OnBalanceVolume, VolumeWeightedAveragePrice,
};

/// One output series, aligned with the input price series.
pub type Series = Vec<Option<f64>>;

/// Output series name -> values.
pub type IndicatorOutput = BTreeMap<&'static str, Series>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorType {
    Oscillator,
    Overlap,
    Volume,
    Volatility,
}

/// A technical indicator computed over a whole price series.
///
/// Implementations hold no per-call state: `calculate` is a pure function of
/// the series and the config, so a single instance can be shared across
/// threads and requests.
pub trait Indicator: Send + Sync {
    /// Registry key and output namespace.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn formula(&self) -> &'static str;

    fn indicator_type(&self) -> IndicatorType;

    fn default_config(&self) -> IndicatorConfig;

    /// Names of every series `calculate` can produce.
    fn outputs(&self) -> &'static [&'static str];

    /// Computes every output series. Each series has exactly `series.len()`
    /// entries. Parameters missing from `config` (or falsy) fall back to
    /// `default_config`.
    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError>;

    fn metadata(&self) -> IndicatorMetadata {
        IndicatorMetadata {
            name: self.name().to_string(),
            indicator_type: self.indicator_type(),
            description: self.description().to_string(),
            formula: self.formula().to_string(),
            default_config: self.default_config(),
            outputs: self.outputs().iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Discovery information published for each registered indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    pub description: String,
    pub formula: String,
    pub default_config: IndicatorConfig,
    pub outputs: Vec<String>,
}

pub(crate) fn require_length(
    indicator: &'static str,
    series: &PriceSeries,
    required: usize,
) -> Result<(), IndicatorError> {
    if series.len() < required {
        return Err(IndicatorError::InsufficientData {
            indicator,
            required,
            available: series.len(),
        });
    }
    Ok(())
}

pub(crate) fn single(name: &'static str, values: Series) -> IndicatorOutput {
    let mut output = IndicatorOutput::new();
    output.insert(name, values);
    output
}

/// Zero-filled copy used when a partially-null series is fed back into a
/// moving average.
pub(crate) fn zero_filled(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(0.0)).collect()
}
