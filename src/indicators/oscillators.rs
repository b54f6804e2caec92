use crate::error::IndicatorError;
use crate::indicators::config::Params;
use crate::indicators::overlaps::{ExponentialMovingAverage, SimpleMovingAverage};
use crate::indicators::{
    require_length, single, ta, zero_filled, Indicator, IndicatorConfig, IndicatorOutput,
    IndicatorType, Series,
};
use crate::market::PriceSeries;

/// Relative Strength Index with Wilder smoothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelativeStrengthIndex;

impl RelativeStrengthIndex {
    pub const NAME: &'static str = "RSI";

    fn rsi(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return 100.0;
        }
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

impl Indicator for RelativeStrengthIndex {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Relative Strength Index"
    }

    fn formula(&self) -> &'static str {
        "RSI = 100 - 100 / (1 + AvgGain_n / AvgLoss_n), Wilder-smoothed averages"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Oscillator
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new().with("period", 14)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["rsi"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let period = params.period("period")?;
        require_length(Self::NAME, series, period.saturating_add(1))?;

        let closes = series.closes();
        let len = closes.len();
        let mut gains = vec![0.0; len];
        let mut losses = vec![0.0; len];
        for i in 1..len {
            let change = closes[i] - closes[i - 1];
            if change > 0.0 {
                gains[i] = change;
            } else if change < 0.0 {
                losses[i] = -change;
            }
        }

        let mut results = vec![None; len];
        let mut avg_gain = gains[1..=period].iter().sum::<f64>() / period as f64;
        let mut avg_loss = losses[1..=period].iter().sum::<f64>() / period as f64;
        results[period] = Some(Self::rsi(avg_gain, avg_loss));

        let weight = (period - 1) as f64;
        for i in period + 1..len {
            avg_gain = (avg_gain * weight + gains[i]) / period as f64;
            avg_loss = (avg_loss * weight + losses[i]) / period as f64;
            results[i] = Some(Self::rsi(avg_gain, avg_loss));
        }

        Ok(single("rsi", results))
    }
}

/// MACD line, its signal EMA and the histogram between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovingAverageConvergenceDivergence {
    ema: ExponentialMovingAverage,
}

impl MovingAverageConvergenceDivergence {
    pub const NAME: &'static str = "MACD";
}

impl Indicator for MovingAverageConvergenceDivergence {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Moving Average Convergence Divergence"
    }

    fn formula(&self) -> &'static str {
        "MACD = EMA_fast(C) - EMA_slow(C); Signal = EMA_signal(MACD); Histogram = MACD - Signal"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Oscillator
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new()
            .with("fastPeriod", 12)
            .with("slowPeriod", 26)
            .with("signalPeriod", 9)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["macdLine", "signalLine", "histogram"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let fast_period = params.period("fastPeriod")?;
        let slow_period = params.period("slowPeriod")?;
        let signal_period = params.period("signalPeriod")?;
        require_length(Self::NAME, series, slow_period.saturating_add(signal_period))?;

        let closes = series.closes();
        let fast = self.ema.values(&closes, fast_period);
        let slow = self.ema.values(&closes, slow_period);

        let macd_line: Series = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| Some((*f)? - (*s)?))
            .collect();

        // The warm-up nulls enter the signal EMA as zeros
        let signal = self.ema.values(&zero_filled(&macd_line), signal_period);

        let signal_line: Series = macd_line
            .iter()
            .zip(&signal)
            .map(|(m, s)| m.and(*s))
            .collect();
        let histogram: Series = macd_line
            .iter()
            .zip(&signal)
            .map(|(m, s)| Some((*m)? - (*s)?))
            .collect();

        let mut output = IndicatorOutput::new();
        output.insert("macdLine", macd_line);
        output.insert("signalLine", signal_line);
        output.insert("histogram", histogram);
        Ok(output)
    }
}

/// Stochastic Oscillator with optional %K slowing.
///
/// A window with no high/low range divides by zero and yields NaN or
/// infinity.
#[derive(Debug, Clone, Copy, Default)]
pub struct StochasticOscillator {
    sma: SimpleMovingAverage,
}

impl StochasticOscillator {
    pub const NAME: &'static str = "STOCH";
}

impl Indicator for StochasticOscillator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Stochastic Oscillator"
    }

    fn formula(&self) -> &'static str {
        "%K = (C - LL_k) / (HH_k - LL_k) * 100, averaged over the slowing period; %D = SMA_d(%K)"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Oscillator
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new()
            .with("kPeriod", 14)
            .with("dPeriod", 3)
            .with("slowingPeriod", 3)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["k", "d"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let k_period = params.period("kPeriod")?;
        let d_period = params.period("dPeriod")?;
        let slowing = params.period("slowingPeriod")?;
        require_length(
            Self::NAME,
            series,
            k_period.saturating_add(slowing).saturating_add(d_period),
        )?;

        let quotes = series.quotes();
        let raw_k = |i: usize| ta::stochastic_k(series.window(i, k_period), quotes[i].close);

        let k: Series = (0..quotes.len())
            .map(|i| {
                if i + 1 < k_period {
                    return None;
                }
                if slowing > 1 {
                    if i + 1 < k_period + slowing {
                        return None;
                    }
                    let sum: f64 = (0..slowing).map(|j| raw_k(i - j)).sum();
                    return Some(sum / slowing as f64);
                }
                Some(raw_k(i))
            })
            .collect();

        let smoothed = self.sma.values(&zero_filled(&k), d_period);
        let d: Series = (0..quotes.len())
            .map(|i| {
                if i + 1 < d_period || k[i + 1 - d_period..=i].iter().any(Option::is_none) {
                    return None;
                }
                smoothed[i]
            })
            .collect();

        let mut output = IndicatorOutput::new();
        output.insert("k", k);
        output.insert("d", d);
        Ok(output)
    }
}

/// Commodity Channel Index over typical prices.
///
/// Zero mean deviation divides by zero and yields NaN or infinity.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommodityChannelIndex;

impl CommodityChannelIndex {
    pub const NAME: &'static str = "CCI";
}

impl Indicator for CommodityChannelIndex {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Commodity Channel Index"
    }

    fn formula(&self) -> &'static str {
        "CCI = (TP - SMA_n(TP)) / (0.015 * MeanDeviation_n(TP)), TP = (H + L + C) / 3"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Oscillator
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new().with("period", 20)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["cci"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let period = params.period("period")?;
        require_length(Self::NAME, series, period)?;

        let typical: Vec<f64> = series.iter().map(ta::typical_price).collect();
        let results = (0..typical.len())
            .map(|i| {
                if i + 1 < period {
                    return None;
                }
                let window = &typical[i + 1 - period..=i];
                let sma = window.iter().sum::<f64>() / period as f64;
                let mean_deviation = ta::mean_deviation(window, sma);
                Some((typical[i] - sma) / (0.015 * mean_deviation))
            })
            .collect();

        Ok(single("cci", results))
    }
}

/// Williams %R, in [-100, 0].
#[derive(Debug, Clone, Copy, Default)]
pub struct WilliamsR;

impl WilliamsR {
    pub const NAME: &'static str = "WILLIAMS_R";
}

impl Indicator for WilliamsR {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Williams %R"
    }

    fn formula(&self) -> &'static str {
        "%R = (HH_n - C) / (HH_n - LL_n) * -100"
    }

    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Oscillator
    }

    fn default_config(&self) -> IndicatorConfig {
        IndicatorConfig::new().with("period", 14)
    }

    fn outputs(&self) -> &'static [&'static str] {
        &["williamsR"]
    }

    fn calculate(
        &self,
        series: &PriceSeries,
        config: &IndicatorConfig,
    ) -> Result<IndicatorOutput, IndicatorError> {
        let params = Params::new(Self::NAME, config, self.default_config());
        let period = params.period("period")?;
        require_length(Self::NAME, series, period)?;

        let results = series
            .iter()
            .enumerate()
            .map(|(i, quote)| {
                if i + 1 < period {
                    return None;
                }
                let window = series.window(i, period);
                let highest = ta::highest_high(window);
                let lowest = ta::lowest_low(window);
                Some(((highest - quote.close) / (highest - lowest)) * -100.0)
            })
            .collect();

        Ok(single("williamsR", results))
    }
}
