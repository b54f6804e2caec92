use crate::error::RequestError;
use crate::indicators::IndicatorOverrides;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One evaluation request: which symbol, over which dates, with which
/// indicators and parameter overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalRequest {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub overrides: IndicatorOverrides,
}

impl TechnicalRequest {
    pub fn new(symbol: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start_date,
            end_date,
            indicators: Vec::new(),
            overrides: IndicatorOverrides::new(),
        }
    }

    pub fn with_indicators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indicators.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_override(mut self, indicator: &str, param: &str, value: &str) -> Self {
        self.overrides.set(indicator, param, value);
        self
    }

    /// Builds a request from flat query-style pairs.
    ///
    /// Recognised keys are `symbol`, `startDate`, `endDate` and a
    /// comma-separated `indicators`; the first occurrence of each wins. Any
    /// key containing a dot is an `INDICATOR.param` override, later pairs
    /// overwriting earlier ones. Missing dates default to the `lookback_days`
    /// window ending `today`.
    pub fn from_params<I, K, V>(
        params: I,
        today: NaiveDate,
        lookback_days: i64,
    ) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut symbol = None;
        let mut start = None;
        let mut end = None;
        let mut indicators = None;
        let mut overrides = IndicatorOverrides::new();

        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "symbol" => {
                    symbol.get_or_insert_with(|| value.to_string());
                }
                "startDate" => {
                    start.get_or_insert_with(|| value.to_string());
                }
                "endDate" => {
                    end.get_or_insert_with(|| value.to_string());
                }
                "indicators" => {
                    indicators.get_or_insert_with(|| value.to_string());
                }
                _ => {
                    overrides.insert_dotted(key, value);
                }
            }
        }

        let symbol = symbol
            .filter(|s| !s.is_empty())
            .ok_or(RequestError::MissingSymbol)?;
        let end_date = parse_date("endDate", end.as_deref())?.unwrap_or(today);
        let start_date = match parse_date("startDate", start.as_deref())? {
            Some(date) => date,
            None => Duration::try_days(lookback_days)
                .and_then(|lookback| today.checked_sub_signed(lookback))
                .ok_or(RequestError::InvalidLookback {
                    days: lookback_days,
                    today,
                })?,
        };
        let indicators = indicators
            .map(|list| {
                list.split(',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            symbol,
            start_date,
            end_date,
            indicators,
            overrides,
        })
    }

    /// Short human-readable description used in logs.
    pub fn label(&self) -> String {
        format!(
            "{} {}..{} [{}]",
            self.symbol.to_uppercase(),
            self.start_date.format(DATE_FORMAT),
            self.end_date.format(DATE_FORMAT),
            self.indicators.join(","),
        )
    }
}

/// An empty value counts as absent.
fn parse_date(param: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, RequestError> {
    match value {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| RequestError::InvalidDate {
                param,
                value: value.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_full_request() {
        let request = TechnicalRequest::from_params(
            [
                ("symbol", "AAPL"),
                ("startDate", "2024-01-02"),
                ("endDate", "2024-03-28"),
                ("indicators", "SMA,MACD"),
                ("SMA.period", "10"),
                ("MACD.fastPeriod", "8"),
            ],
            date(2024, 6, 1),
            90,
        )
        .unwrap();

        assert_eq!(request.symbol, "AAPL");
        assert_eq!(request.start_date, date(2024, 1, 2));
        assert_eq!(request.end_date, date(2024, 3, 28));
        assert_eq!(request.indicators, vec!["SMA", "MACD"]);
        assert_eq!(
            request
                .overrides
                .get("MACD")
                .and_then(|c| c.get("fastPeriod"))
                .map(ToString::to_string),
            Some("8".to_string())
        );
    }

    #[test]
    fn dates_default_to_lookback_window() {
        let today = date(2024, 6, 1);
        let request = TechnicalRequest::from_params([("symbol", "MSFT")], today, 90).unwrap();

        assert_eq!(request.end_date, today);
        assert_eq!(request.start_date, date(2024, 3, 3));
        assert!(request.indicators.is_empty());
        assert!(request.overrides.is_empty());
    }

    #[test]
    fn out_of_range_lookback_is_an_error() {
        let today = date(2024, 6, 1);

        for days in [i64::MAX, i64::MIN, 10_000_000_000] {
            assert_eq!(
                TechnicalRequest::from_params([("symbol", "MSFT")], today, days),
                Err(RequestError::InvalidLookback { days, today })
            );
        }

        // An explicit start date never consults the lookback
        let request = TechnicalRequest::from_params(
            [("symbol", "MSFT"), ("startDate", "2024-01-02")],
            today,
            i64::MAX,
        )
        .unwrap();
        assert_eq!(request.start_date, date(2024, 1, 2));
    }

    #[test]
    fn symbol_is_required() {
        let today = date(2024, 6, 1);
        assert_eq!(
            TechnicalRequest::from_params([("indicators", "SMA")], today, 90),
            Err(RequestError::MissingSymbol)
        );
        assert_eq!(
            TechnicalRequest::from_params([("symbol", "")], today, 90),
            Err(RequestError::MissingSymbol)
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = TechnicalRequest::from_params(
            [("symbol", "AAPL"), ("startDate", "01/02/2024")],
            date(2024, 6, 1),
            90,
        )
        .unwrap_err();

        assert_eq!(
            err,
            RequestError::InvalidDate {
                param: "startDate",
                value: "01/02/2024".to_string()
            }
        );
    }

    #[test]
    fn first_value_wins_but_later_overrides_replace() {
        let request = TechnicalRequest::from_params(
            [
                ("symbol", "AAPL"),
                ("symbol", "MSFT"),
                ("indicators", "RSI,,"),
                ("RSI.period", "7"),
                ("RSI.period", "9"),
                ("limit", "5"),
            ],
            date(2024, 6, 1),
            90,
        )
        .unwrap();

        assert_eq!(request.symbol, "AAPL");
        assert_eq!(request.indicators, vec!["RSI"]);
        assert_eq!(
            request
                .overrides
                .get("RSI")
                .and_then(|c| c.get("period"))
                .map(ToString::to_string),
            Some("9".to_string())
        );
        assert!(request.overrides.get("limit").is_none());
    }

    #[test]
    fn label_names_symbol_range_and_indicators() {
        let request = TechnicalRequest::new("aapl", date(2024, 1, 2), date(2024, 2, 1))
            .with_indicators(["SMA", "RSI"])
            .with_override("SMA", "period", "5");

        assert_eq!(request.label(), "AAPL 2024-01-02..2024-02-01 [SMA,RSI]");
    }
}
