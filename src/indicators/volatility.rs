use crate::error::IndicatorError;
use crate::indicators::config::Params;
use crate::indicators::{
    require_length, single, ta, Indicator, IndicatorConfig, IndicatorOutput, IndicatorType, Series,
};
use crate::market::PriceSeries;

/// True Range. Undefined on the first quote, which has no previous close.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrueRange;

impl TrueRange {
    pub const NAME: &'static str = "TR";

    pub fn values(&self, series: &PriceSeries) -> Series {
        series
            .iter()
            .enumerate()
            .map(|(i, quote)| {
                let prev = series.get(i.checked_sub(1)?)?;
                Some(ta::true_range(quote, prev.close))
            })
            .collect()
    }
}

impl Indicator for TrueRange {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "True Range"
    }

    fn formula(&self) -> &'static str {
        "TR = max(H_t - L_t, |H_t - C_{t-1}|, |L_t - C_{t-1}|)"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Volatility
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new()
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["tr"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        _config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        require_length(Self::NAME, series, 2)?;
        Ok(single("tr", self.values(series)))
    }
}

/// Average True Range as a simple moving average of TR.
///
/// The undefined first TR counts as zero inside its window, so ATR is
/// reported from index `period - 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageTrueRange {
    true_range: TrueRange,
}

impl AverageTrueRange {
    pub const NAME: &'static str = "ATR";
}

impl Indicator for AverageTrueRange {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Average True Range"
    }

    fn formula(&self) -> &'static str {
        "ATR_t = (TR_t + TR_{t-1} + ... + TR_{t-n+1}) / n"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Volatility
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new().with("period", 14)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["atr"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let period = params.period("period")?;
        require_length(Self::NAME, series, period)?;

        let tr = self.true_range.values(series);
        let atr = (0..tr.len())
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let sum = tr[i + 1 - period..=i]
                    .iter()
                    .fold(0.0, |acc, v| acc + v.unwrap_or(0.0));
                Some(sum / period as f64)
            })
            .collect();

        Ok(single("atr", atr))
    }
}
