use crate::error::IndicatorError;
use crate::indicators::config::Params;
use crate::indicators::{
    require_length, single, ta, Indicator, IndicatorConfig, IndicatorOutput, IndicatorType, Series,
};
use crate::market::PriceSeries;

/// Simple Moving Average of the close.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMovingAverage;

impl SimpleMovingAverage {
    pub const NAME: &'static str = "SMA";

    /// SMA over an arbitrary value sequence.
    pub fn values(&self, values: &[f64], period: usize) -> Series {
        ta::simple_moving_average(values, period)
    }
}

impl Indicator for SimpleMovingAverage {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Simple Moving Average"
    }

    fn formula(&self) -> &'static str {
        "SMA_t = (C_t + C_{t-1} + ... + C_{t-n+1}) / n"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Overlap
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new().with("period", 14)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["sma"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let period = params.period("period")?;
        require_length(Self::NAME, series, period)?;

        Ok(single("sma", self.values(&series.closes(), period)))
    }
}

/// Exponential Moving Average of the close, seeded with the SMA.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialMovingAverage;

impl ExponentialMovingAverage {
    pub const NAME: &'static str = "EMA";

    /// EMA over an arbitrary value sequence.
    pub fn values(&self, values: &[f64], period: usize) -> Series {
        ta::exponential_moving_average(values, period)
    }
}

impl Indicator for ExponentialMovingAverage {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Exponential Moving Average"
    }

    fn formula(&self) -> &'static str {
        "EMA_t = (C_t - EMA_{t-1}) * (2 / (n + 1)) + EMA_{t-1}, seeded with SMA_n"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Overlap
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new().with("period", 14)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["ema"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let period = params.period("period")?;
        require_length(Self::NAME, series, period)?;

        Ok(single("ema", self.values(&series.closes(), period)))
    }
}

/// Bollinger Bands: SMA middle band with population standard deviation
/// envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BollingerBands {
    sma: SimpleMovingAverage,
}

impl BollingerBands {
    pub const NAME: &'static str = "BB";
}

impl Indicator for BollingerBands {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Bollinger Bands"
    }

    fn formula(&self) -> &'static str {
        "Middle = SMA_n(C); Upper = Middle + k * StdDev_n(C); Lower = Middle - k * StdDev_n(C)"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Overlap
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new().with("period", 20).with("stdDev", 2)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["upperBand", "middleBand", "lowerBand"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let period = params.period("period")?;
        let multiplier = params.number("stdDev");
        require_length(Self::NAME, series, period)?;

        let closes = series.closes();
        let middle = self.sma.values(&closes, period);

        let mut upper = vec![None; closes.len()];
        let mut lower = vec![None; closes.len()];
        for (i, mean) in middle.iter().enumerate() {
            let Some(mean) = *mean else { continue };
            let std_dev = ta::population_std_dev(&closes[i + 1 - period..=i], mean);
            upper[i] = Some(mean + multiplier * std_dev);
            lower[i] = Some(mean - multiplier * std_dev);
        }

        let mut output = IndicatorOutput::new();
        output.insert("upperBand", upper);
        output.insert("middleBand", middle);
        output.insert("lowerBand", lower);
        Ok(output)
    }
}

/// Which Ichimoku lines `calculate` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IchimokuOutput {
    /// All five lines.
    Full,
    /// Only the conversion line.
    Tenkan,
}

/// Ichimoku Kinko Hyo. Spans are reported at the index they were computed
/// on, not displaced forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct IchimokuCloud;

impl IchimokuCloud {
    pub const NAME: &'static str = "ICHIMOKU";

    fn midpoints(series: &PriceSeries, period: usize) -> Series {
        (0..series.len())
            .map(|i| {
                if i + 1 < period {
                    None
                } else {
                    Some(ta::high_low_midpoint(series.window(i, period)))
                }
            })
            .collect()
    }
}

impl Indicator for IchimokuCloud {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Ichimoku Cloud"
    }

    fn formula(&self) -> &'static str {
        "Tenkan = (HH_9 + LL_9) / 2; Kijun = (HH_26 + LL_26) / 2; Senkou A = (Tenkan + Kijun) / 2; \
         Senkou B = (HH_52 + LL_52) / 2; Chikou = C"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Overlap
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new()
            .with("tenkanPeriod", 9)
            .with("kijunPeriod", 26)
            .with("senkouSpanBPeriod", 52)
            .with("displacement", 26)
            .with("output", "full")
    }

    fn outputs(&self) -> &'static [&'static str] {
        &[
            "tenkanSen",
            "kijunSen",
            "senkouSpanA",
            "senkouSpanB",
            "chikouSpan",
        ]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let tenkan_period = params.period("tenkanPeriod")?;
        let kijun_period = params.period("kijunPeriod")?;
        let senkou_b_period = params.period("senkouSpanBPeriod")?;
        let displacement = params.period("displacement")?;
        let mode = match params.text("output").as_str() {
            "full" => IchimokuOutput::Full,
            "tenkan" => IchimokuOutput::Tenkan,
            _ => return Err(params.invalid("output")),
        };
        require_length(
            Self::NAME,
            series,
            kijun_period.max(senkou_b_period).saturating_add(displacement),
        )?;

        let tenkan = Self::midpoints(series, tenkan_period);
        if mode == IchimokuOutput::Tenkan {
            // Every declared line stays present; only the conversion line has values
            let mut output: IndicatorOutput = self
                .outputs()
                .iter()
                .map(|&name| (name, vec![None; series.len()]))
                .collect();
            output.insert("tenkanSen", tenkan);
            return Ok(output);
        }

        let kijun = Self::midpoints(series, kijun_period);
        let senkou_a = tenkan
            .iter()
            .zip(&kijun)
            .map(|(t, k)| Some(((*t)? + (*k)?) / 2.0))
            .collect();
        let senkou_b = Self::midpoints(series, senkou_b_period);
        let chikou = series
            .iter()
            .enumerate()
            .map(|(i, q)| if i < displacement { None } else { Some(q.close) })
            .collect();

        let mut output = IndicatorOutput::new();
        output.insert("tenkanSen", tenkan);
        output.insert("kijunSen", kijun);
        output.insert("senkouSpanA", senkou_a);
        output.insert("senkouSpanB", senkou_b);
        output.insert("chikouSpan", chikou);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_close, series_from_closes, wavy_series};

    #[test]
    fn sma_constant_series() {
        let series = series_from_closes(&[100.0; 30]);
        let output = SimpleMovingAverage
            .calculate(&series, &IndicatorConfig::new())
            .unwrap();
        let sma = &output["sma"];

        assert_eq!(sma.len(), 30);
        assert!(sma[..13].iter().all(Option::is_none));
        assert!(sma[13..].iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn sma_respects_period_override() {
        let series = series_from_closes(&[1.0, 2.0, 3.0, 4.0]);
        let config = IndicatorConfig::new().with("period", "2");
        let output = SimpleMovingAverage.calculate(&series, &config).unwrap();

        assert_eq!(output["sma"], vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn sma_insufficient_data() {
        let series = series_from_closes(&[1.0; 5]);
        let err = SimpleMovingAverage
            .calculate(&series, &IndicatorConfig::new())
            .unwrap_err();

        assert_eq!(
            err,
            IndicatorError::InsufficientData {
                indicator: "SMA",
                required: 14,
                available: 5,
            }
        );
    }

    #[test]
    fn ema_seed_matches_sma() {
        let series = wavy_series(40);
        let config = IndicatorConfig::new().with("period", 10);
        let ema = &ExponentialMovingAverage.calculate(&series, &config).unwrap()["ema"];
        let sma = &SimpleMovingAverage.calculate(&series, &config).unwrap()["sma"];

        assert!(ema[..9].iter().all(Option::is_none));
        assert_close(ema[9].unwrap(), sma[9].unwrap());
        assert!(ema[10..].iter().all(Option::is_some));
    }

    #[test]
    fn bollinger_bands_are_symmetric_around_sma() {
        let series = wavy_series(30);
        let output = BollingerBands::default()
            .calculate(&series, &IndicatorConfig::new())
            .unwrap();

        for i in 0..30 {
            match (output["upperBand"][i], output["middleBand"][i], output["lowerBand"][i]) {
                (Some(upper), Some(middle), Some(lower)) => {
                    assert!(i >= 19);
                    assert_close(upper - middle, middle - lower);
                    assert!(upper >= middle);
                }
                (None, None, None) => assert!(i < 19),
                other => panic!("misaligned bands at {i}: {other:?}"),
            }
        }
    }

    #[test]
    fn bollinger_known_values() {
        let series = series_from_closes(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let config = IndicatorConfig::new().with("period", 8).with("stdDev", "1.5");
        let output = BollingerBands::default().calculate(&series, &config).unwrap();

        assert_eq!(output["middleBand"][7], Some(5.0));
        assert_eq!(output["upperBand"][7], Some(8.0));
        assert_eq!(output["lowerBand"][7], Some(2.0));
    }

    #[test]
    fn ichimoku_full_output() {
        let series = wavy_series(80);
        let output = IchimokuCloud
            .calculate(&series, &IndicatorConfig::new())
            .unwrap();

        assert_eq!(output.len(), 5);
        assert!(output["tenkanSen"][7].is_none());
        assert!(output["tenkanSen"][8].is_some());
        assert!(output["kijunSen"][24].is_none());
        assert!(output["kijunSen"][25].is_some());
        assert!(output["senkouSpanB"][50].is_none());
        assert!(output["senkouSpanB"][51].is_some());
        assert!(output["chikouSpan"][25].is_none());
        assert_eq!(output["chikouSpan"][26], Some(series.quotes()[26].close));

        let a = output["senkouSpanA"][30].unwrap();
        let expected = (output["tenkanSen"][30].unwrap() + output["kijunSen"][30].unwrap()) / 2.0;
        assert_close(a, expected);
    }

    #[test]
    fn ichimoku_tenkan_only_mode() {
        let series = wavy_series(80);
        let config = IndicatorConfig::new().with("output", "tenkan");
        let output = IchimokuCloud.calculate(&series, &config).unwrap();

        assert_eq!(output.keys().count(), 5);
        assert!(output["tenkanSen"][8].is_some());
        for line in ["kijunSen", "senkouSpanA", "senkouSpanB", "chikouSpan"] {
            assert_eq!(output[line].len(), series.len());
            assert!(output[line].iter().all(Option::is_none), "{line}");
        }
    }

    #[test]
    fn ichimoku_rejects_unknown_mode_and_short_series() {
        let series = wavy_series(80);
        let config = IndicatorConfig::new().with("output", "cloud");
        assert!(matches!(
            IchimokuCloud.calculate(&series, &config),
            Err(IndicatorError::InvalidParameter { .. })
        ));

        let short = wavy_series(77);
        assert!(matches!(
            IchimokuCloud.calculate(&short, &IndicatorConfig::new()),
            Err(IndicatorError::InsufficientData { required: 78, .. })
        ));
    }
}
