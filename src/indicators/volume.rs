use crate::error::IndicatorError;
use crate::indicators::config::Params;
use crate::indicators::{
    require_length, single, ta, Indicator, IndicatorConfig, IndicatorOutput, IndicatorType,
};
use crate::market::PriceSeries;

/// On Balance Volume, seeded at 0 on the first quote.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnBalanceVolume;

impl OnBalanceVolume {
    pub const NAME: &'static str = "OBV";
}

impl Indicator for OnBalanceVolume {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "On Balance Volume"
    }

    fn formula(&self) -> &'static str {
        "OBV_t = OBV_{t-1} + V_t if C_t > C_{t-1}; OBV_{t-1} - V_t if C_t < C_{t-1}; else OBV_{t-1}"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Volume
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new()
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["obv"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        _config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        require_length(Self::NAME, series, 2)?;

        let quotes = series.quotes();
        let mut results = Vec::with_capacity(quotes.len());
        let mut obv = 0.0;
        results.push(Some(obv));

        for pair in quotes.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.close > previous.close {
                obv += current.volume;
            } else if current.close < previous.close {
                obv -= current.volume;
            }
            results.push(Some(obv));
        }

        Ok(single("obv", results))
    }
}

/// Volume Weighted Average Price, cumulative from the first quote.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeWeightedAveragePrice;

impl VolumeWeightedAveragePrice {
    pub const NAME: &'static str = "VWAP";
}

impl Indicator for VolumeWeightedAveragePrice {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Volume Weighted Average Price"
    }

    fn formula(&self) -> &'static str {
        "VWAP_t = sum(TP_i * V_i) / sum(V_i) for i <= t, TP = (H + L + C) / 3"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Volume
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new()
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["vwap"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        _config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        require_length(Self::NAME, series, 1)?;

        let mut cumulative_pv = 0.0;
        let mut cumulative_volume = 0.0;
        let results = series
            .iter()
            .map(|quote| {
                cumulative_pv += ta::typical_price(quote) * quote.volume;
                cumulative_volume += quote.volume;
                // 0/0 while no volume has traded yields NaN
                Some(cumulative_pv / cumulative_volume)
            })
            .collect();

        Ok(single("vwap", results))
    }
}

/// Chaikin Money Flow over a rolling window.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaikinMoneyFlow;

impl ChaikinMoneyFlow {
    pub const NAME: &'static str = "CMF";
}

impl Indicator for ChaikinMoneyFlow {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Chaikin Money Flow"
    }

    fn formula(&self) -> &'static str {
        "CMF = sum_n(MFV) / sum_n(V), MFV = ((C - L) - (H - C)) / (H - L) * V"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Volume
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new().with("period", 20)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["cmf"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let period = params.period("period")?;
        require_length(Self::NAME, series, period)?;

        let flows: Vec<f64> = series.iter().map(ta::money_flow_volume).collect();
        let volumes = series.volumes();

        let results = (0..series.len())
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let window = i + 1 - period..i + 1;
                let sum_flow: f64 = flows[window.clone()].iter().sum();
                let sum_volume: f64 = volumes[window].iter().sum();
                if sum_volume == 0.0 {
                    Some(0.0)
                } else {
                    Some(sum_flow / sum_volume)
                }
            })
            .collect();

        Ok(single("cmf", results))
    }
}

/// Accumulation/Distribution Line: running total of money flow volume.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccumulationDistributionLine;

impl AccumulationDistributionLine {
    pub const NAME: &'static str = "AD_LINE";
}

impl Indicator for AccumulationDistributionLine {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Accumulation/Distribution Line"
    }

    fn formula(&self) -> &'static str {
        "AD_t = AD_{t-1} + ((C - L) - (H - C)) / (H - L) * V"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Volume
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new()
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["adLine"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        _config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        require_length(Self::NAME, series, 1)?;

        let mut ad_line = 0.0;
        let results = series
            .iter()
            .map(|quote| {
                // Flat days leave the line unchanged
                if quote.high != quote.low {
                    ad_line += ta::money_flow_volume(quote);
                }
                Some(ad_line)
            })
            .collect();

        Ok(single("adLine", results))
    }
}
