use crate::error::IndicatorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single scalar parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ConfigValue {
    /// Numeric coercion with `Number(...)` semantics: booleans map to 1/0,
    /// blank text to 0, unparseable text to NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            ConfigValue::Number(n) => *n,
            ConfigValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            ConfigValue::Text(s) => parse_number(s),
        }
    }

    /// False for 0, NaN, empty text and `false`.
    pub fn is_truthy(&self) -> bool {
        match self {
            ConfigValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ConfigValue::Bool(b) => *b,
            ConfigValue::Text(s) => !s.is_empty(),
        }
    }
}

fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // f64::from_str also accepts "inf" and "nan", which Number() does not
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Number(n) => write!(f, "{}", n),
            ConfigValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Number(value)
    }
}

impl From<usize> for ConfigValue {
    fn from(value: usize) -> Self {
        ConfigValue::Number(value as f64)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Number(value as f64)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

/// Parameter name -> value mapping for one indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorConfig(BTreeMap<String, ConfigValue>);

impl IndicatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy of `self` with every key of `overrides` laid on top.
    pub fn merged(&self, overrides: &IndicatorConfig) -> IndicatorConfig {
        let mut merged = self.clone();
        for (key, value) in &overrides.0 {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// Per-indicator partial configs supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorOverrides(BTreeMap<String, IndicatorConfig>);

impl IndicatorOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every `indicator.param=value` pair; keys without a dot are
    /// ignored.
    pub fn from_dotted<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut overrides = Self::new();
        for (key, value) in pairs {
            overrides.insert_dotted(key.as_ref(), value.into());
        }
        overrides
    }

    /// Applies a single dotted key. Only the first two segments count, so
    /// `a.b.c` sets parameter `b` of indicator `a`. Returns false when the key
    /// has no dot.
    pub fn insert_dotted(&mut self, key: &str, value: impl Into<ConfigValue>) -> bool {
        let mut parts = key.split('.');
        let (Some(indicator), Some(param)) = (parts.next(), parts.next()) else {
            return false;
        };
        self.set(indicator, param, value);
        true
    }

    pub fn set(&mut self, indicator: &str, param: &str, value: impl Into<ConfigValue>) {
        self.0
            .entry(indicator.to_string())
            .or_default()
            .set(param, value);
    }

    pub fn get(&self, indicator: &str) -> Option<&IndicatorConfig> {
        self.0.get(indicator)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndicatorConfig)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Reads parameters for one `calculate` call. A configured value that is
/// falsy falls back to the indicator's default.
pub(crate) struct Params<'a> {
    indicator: &'static str,
    config: &'a IndicatorConfig,
    defaults: IndicatorConfig,
}

impl<'a> Params<'a> {
    pub(crate) fn new(
        indicator: &'static str,
        config: &'a IndicatorConfig,
        defaults: IndicatorConfig,
    ) -> Self {
        Self {
            indicator,
            config,
            defaults,
        }
    }

    fn lookup(&self, key: &str) -> Option<&ConfigValue> {
        self.config
            .get(key)
            .filter(|value| value.is_truthy())
            .or_else(|| self.defaults.get(key))
    }

    pub(crate) fn number(&self, key: &str) -> f64 {
        self.lookup(key)
            .map(ConfigValue::to_number)
            .unwrap_or(f64::NAN)
    }

    /// A window length: must coerce to a positive integer.
    pub(crate) fn period(&self, key: &str) -> Result<usize, IndicatorError> {
        let value = self.number(key);
        if value.is_finite() && value >= 1.0 && value.fract() == 0.0 {
            Ok(value as usize)
        } else {
            Err(self.invalid(key))
        }
    }

    pub(crate) fn text(&self, key: &str) -> String {
        self.lookup(key).map(|v| v.to_string()).unwrap_or_default()
    }

    pub(crate) fn invalid(&self, key: &str) -> IndicatorError {
        IndicatorError::InvalidParameter {
            indicator: self.indicator,
            param: key.to_string(),
            value: self.lookup(key).map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_coercion_follows_number_semantics() {
        assert_eq!(ConfigValue::from("20").to_number(), 20.0);
        assert_eq!(ConfigValue::from(" 2.5 ").to_number(), 2.5);
        assert_eq!(ConfigValue::from("").to_number(), 0.0);
        assert_eq!(ConfigValue::from(true).to_number(), 1.0);
        assert_eq!(ConfigValue::from("-Infinity").to_number(), f64::NEG_INFINITY);
        assert!(ConfigValue::from("abc").to_number().is_nan());
        assert!(ConfigValue::from("inf").to_number().is_nan());
    }

    #[test]
    fn merge_overlays_per_key() {
        let defaults = IndicatorConfig::new()
            .with("fastPeriod", 12)
            .with("slowPeriod", 26)
            .with("signalPeriod", 9);
        let overrides = IndicatorConfig::new().with("fastPeriod", "5");

        let merged = defaults.merged(&overrides);

        assert_eq!(merged.get("fastPeriod"), Some(&ConfigValue::from("5")));
        assert_eq!(merged.get("slowPeriod"), Some(&ConfigValue::from(26)));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn dotted_keys_build_overrides() {
        let overrides = IndicatorOverrides::from_dotted(vec![
            ("SMA.period", "20"),
            ("MACD.fastPeriod", "5"),
            ("MACD.slowPeriod", "10"),
            ("symbol", "AAPL"),
            ("BB.stdDev.extra", "3"),
        ]);

        assert_eq!(
            overrides.get("SMA").and_then(|c| c.get("period")),
            Some(&ConfigValue::from("20"))
        );
        assert_eq!(overrides.get("MACD").map(IndicatorConfig::len), Some(2));
        assert_eq!(
            overrides.get("BB").and_then(|c| c.get("stdDev")),
            Some(&ConfigValue::from("3"))
        );
        assert!(overrides.get("symbol").is_none());
    }

    #[test]
    fn falsy_values_fall_back_to_defaults() {
        let defaults = IndicatorConfig::new().with("period", 14);
        let config = IndicatorConfig::new().with("period", 0);
        let params = Params::new("SMA", &config, defaults);

        assert_eq!(params.period("period").unwrap(), 14);
    }

    #[test]
    fn non_integer_period_is_rejected() {
        let defaults = IndicatorConfig::new().with("period", 14);
        let config = IndicatorConfig::new().with("period", "abc");
        let params = Params::new("SMA", &config, defaults);

        assert_eq!(
            params.period("period").unwrap_err(),
            IndicatorError::InvalidParameter {
                indicator: "SMA",
                param: "period".to_string(),
                value: "abc".to_string(),
            }
        );

        let config = IndicatorConfig::new().with("period", "2.5");
        let params = Params::new("SMA", &config, IndicatorConfig::new());
        assert!(params.period("period").is_err());
    }

    #[test]
    fn deserializes_mixed_scalars() {
        let config: IndicatorConfig =
            serde_json::from_str(r#"{"period": 20, "stdDev": "2.5", "full": true}"#).unwrap();

        assert_eq!(config.get("period"), Some(&ConfigValue::Number(20.0)));
        assert_eq!(config.get("stdDev"), Some(&ConfigValue::Text("2.5".into())));
        assert_eq!(config.get("full"), Some(&ConfigValue::Bool(true)));
    }
}
