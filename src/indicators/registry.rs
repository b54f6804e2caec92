use crate::indicators::{
    AccumulationDistributionLine, AverageTrueRange, BollingerBands, ChaikinMoneyFlow,
    CommodityChannelIndex, ExponentialMovingAverage, IchimokuCloud, Indicator,
    IndicatorMetadata, MovingAverageConvergenceDivergence, OnBalanceVolume,
    RelativeStrengthIndex, SimpleMovingAverage, StochasticOscillator, TrueRange,
    VolumeWeightedAveragePrice, WilliamsR,
};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Catalog of indicators keyed by name, enumerated in registration order.
///
/// Build one with [`IndicatorRegistry::with_defaults`] and share it behind an
/// `Arc`; [`IndicatorRegistry::shared`] hands out a process-wide instance
/// built once on first use.
#[derive(Default)]
pub struct IndicatorRegistry {
    indicators: Vec<Arc<dyn Indicator>>,
    index: HashMap<&'static str, usize>,
}

impl IndicatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding one instance of every built-in indicator.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(AverageTrueRange::default());
        registry.register(TrueRange);
        registry.register(SimpleMovingAverage);
        registry.register(ExponentialMovingAverage);
        registry.register(RelativeStrengthIndex);
        registry.register(MovingAverageConvergenceDivergence::default());
        registry.register(BollingerBands::default());
        registry.register(StochasticOscillator::default());
        registry.register(CommodityChannelIndex);
        registry.register(ChaikinMoneyFlow);
        registry.register(OnBalanceVolume);
        registry.register(VolumeWeightedAveragePrice);
        registry.register(WilliamsR);
        registry.register(AccumulationDistributionLine);
        registry.register(IchimokuCloud);
        registry
    }

    /// Process-wide default registry. Concurrent first calls build it once.
    pub fn shared() -> Arc<IndicatorRegistry> {
        static SHARED: OnceLock<Arc<IndicatorRegistry>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(IndicatorRegistry::with_defaults()))
            .clone()
    }

    /// Adds `indicator` under its name. A later registration with the same
    /// name replaces the earlier one but keeps its position.
    pub fn register<I: Indicator + 'static>(&mut self, indicator: I) {
        self.register_arc(Arc::new(indicator));
    }

    pub fn register_arc(&mut self, indicator: Arc<dyn Indicator>) {
        let name = indicator.name();
        match self.index.get(name) {
            Some(&position) => {
                debug!("Replacing registered indicator {}", name);
                self.indicators[position] = indicator;
            }
            None => {
                self.index.insert(name, self.indicators.len());
                self.indicators.push(indicator);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Indicator> {
        self.index
            .get(name)
            .map(|&position| self.indicators[position].as_ref())
    }

    /// Registered names in registration order.
    pub fn available(&self) -> Vec<&'static str> {
        self.indicators.iter().map(|i| i.name()).collect()
    }

    /// Listing metadata for every registered indicator.
    pub fn metadata(&self) -> Vec<IndicatorMetadata> {
        self.indicators.iter().map(|i| i.metadata()).collect()
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndicatorError;
    use crate::indicators::{IndicatorConfig, IndicatorOutput, IndicatorType};
    use crate::market::PriceSeries;

    struct Constant(&'static str, f64);

    impl Indicator for Constant {
        fn name(&self) -> &'static str {
            "SMA"
        }

        fn description(&self) -> &'static str {
            self.0
        }

        fn formula(&self) -> &'static str {
            "c"
        }

        fn indicator_type(&self) -> IndicatorType {
            IndicatorType::Overlap
        }

        fn default_config(&self) -> IndicatorConfig {
            IndicatorConfig::new()
        }

        fn outputs(&self) -> &'static [&'static str] {
            &["sma"]
        }

        fn calculate(
            &self,
            series: &PriceSeries,
            _config: &IndicatorConfig,
        ) -> Result<IndicatorOutput, IndicatorError> {
            let mut output = IndicatorOutput::new();
            output.insert("sma", vec![Some(self.1); series.len()]);
            Ok(output)
        }
    }

    #[test]
    fn defaults_are_listed_in_registration_order() {
        let registry = IndicatorRegistry::with_defaults();

        assert_eq!(
            registry.available(),
            vec![
                "ATR", "TR", "SMA", "EMA", "RSI", "MACD", "BB", "STOCH", "CCI", "CMF", "OBV",
                "VWAP", "WILLIAMS_R", "AD_LINE", "ICHIMOKU",
            ]
        );
    }

    #[test]
    fn lookup_of_unknown_name_is_none() {
        let registry = IndicatorRegistry::with_defaults();

        assert!(registry.get("SMA").is_some());
        assert!(registry.get("sma").is_none());
        assert!(registry.get("UNKNOWN_NAME").is_none());
    }

    #[test]
    fn re_registration_replaces_in_place() {
        let mut registry = IndicatorRegistry::with_defaults();
        let before = registry.available();

        registry.register(Constant("first", 1.0));
        registry.register(Constant("second", 2.0));

        assert_eq!(registry.available(), before);
        assert_eq!(registry.get("SMA").map(|i| i.description()), Some("second"));
    }

    #[test]
    fn metadata_exposes_defaults() {
        let registry = IndicatorRegistry::with_defaults();
        let macd = registry
            .metadata()
            .into_iter()
            .find(|m| m.name == "MACD")
            .unwrap();

        assert_eq!(macd.indicator_type, IndicatorType::Oscillator);
        assert_eq!(macd.default_config.len(), 3);
        assert_eq!(macd.outputs, vec!["macdLine", "signalLine", "histogram"]);

        let json = serde_json::to_value(&macd).unwrap();
        assert_eq!(json["defaultConfig"]["fastPeriod"], 12.0);
        assert_eq!(json["type"], "oscillator");
    }

    #[test]
    fn shared_registry_is_built_once() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(IndicatorRegistry::shared))
            .collect();
        let registries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for registry in &registries[1..] {
            assert!(Arc::ptr_eq(&registries[0], registry));
        }
        assert_eq!(registries[0].len(), 15);
    }
}
