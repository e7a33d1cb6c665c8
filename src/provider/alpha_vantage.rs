//! # provider::alpha_vantage
//!
//! Production [`QuoteProvider`] speaking the Alpha Vantage REST format.
//!
//! ## Wire format quirks this module absorbs
//!
//! * Every numeric field arrives as a **string** (`"05. price": "182.31"`).
//! * Field keys are numbered (`"01. symbol"`, `"09. change"`, ...).
//! * `change percent` carries a trailing `%` that must be stripped.
//! * Throttling is not an HTTP error — a `200` body with a `"Note"` key.
//! * Unknown symbols likewise come back `200` with an `"Error Message"` key.
//! * The daily series is keyed newest-first by date string.

use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{ProviderError, ProviderQuote, QuoteProvider};
use crate::models::PricePoint;

/// Request timeout for all provider calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ─── Client ───────────────────────────────────────────────────────────────────

/// Alpha Vantage REST client.  Cheap to clone; the inner `reqwest::Client`
/// pools connections.
#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl AlphaVantageClient {
    /// `base_url` without a trailing slash, e.g. `https://www.alphavantage.co`.
    pub fn new(api_key: String, base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_key,
            base_url,
            http,
        }
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/query?function={function}&symbol={symbol}&apikey={}",
            self.base_url, self.api_key
        );

        let payload: Value = self.http.get(&url).send().await?.json().await?;

        // Throttling and unknown-symbol responses are 200s with marker keys.
        if let Some(note) = payload.get("Note").and_then(Value::as_str) {
            return Err(ProviderError::RateLimited(note.to_string()));
        }
        if let Some(msg) = payload.get("Error Message").and_then(Value::as_str) {
            return Err(ProviderError::InvalidSymbol(msg.to_string()));
        }

        Ok(payload)
    }
}

// ─── Field helpers ────────────────────────────────────────────────────────────

fn str_field<'a>(obj: &'a Value, key: &str) -> Result<&'a str, ProviderError> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ProviderError::MalformedPayload(format!("missing field `{key}`")))
}

fn f64_field(obj: &Value, key: &str) -> Result<f64, ProviderError> {
    let raw = str_field(obj, key)?;
    raw.trim_end_matches('%')
        .parse()
        .map_err(|_| ProviderError::MalformedPayload(format!("unparseable `{key}`: {raw}")))
}

fn u64_field(obj: &Value, key: &str) -> Result<u64, ProviderError> {
    let raw = str_field(obj, key)?;
    raw.parse()
        .map_err(|_| ProviderError::MalformedPayload(format!("unparseable `{key}`: {raw}")))
}

// ─── QuoteProvider impl ───────────────────────────────────────────────────────

#[async_trait::async_trait]
impl QuoteProvider for AlphaVantageClient {
    async fn get_quote(&self, symbol: &str) -> Result<ProviderQuote, ProviderError> {
        let payload = self.query("GLOBAL_QUOTE", symbol).await?;

        let quote = payload
            .get("Global Quote")
            .filter(|q| q.is_object() && q.get("01. symbol").is_some())
            .ok_or_else(|| {
                ProviderError::MalformedPayload(format!("no Global Quote object for {symbol}"))
            })?;

        let parsed = ProviderQuote {
            symbol: str_field(quote, "01. symbol")?.to_string(),
            price: f64_field(quote, "05. price")?,
            change: f64_field(quote, "09. change")?,
            change_percent: f64_field(quote, "10. change percent")?,
            volume: u64_field(quote, "06. volume")?,
        };

        debug!(symbol = %parsed.symbol, price = parsed.price, "Quote fetched");
        Ok(parsed)
    }

    async fn get_daily_series(&self, symbol: &str) -> Result<Vec<PricePoint>, ProviderError> {
        let payload = self.query("TIME_SERIES_DAILY", symbol).await?;

        let series = payload
            .get("Time Series (Daily)")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ProviderError::MalformedPayload(format!("no daily time series for {symbol}"))
            })?;

        let mut points = Vec::with_capacity(series.len());
        for (date_str, bar) in series {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
                ProviderError::MalformedPayload(format!("bad series date: {date_str}"))
            })?;
            points.push(PricePoint {
                date,
                close: f64_field(bar, "4. close")?,
            });
        }

        debug!(symbol, points = points.len(), "Daily series fetched");
        Ok(points)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quote_payload() -> Value {
        json!({
            "Global Quote": {
                "01. symbol": "AAPL",
                "05. price": "182.3100",
                "06. volume": "53216400",
                "09. change": "-1.5400",
                "10. change percent": "-0.8377%"
            }
        })
    }

    #[test]
    fn test_quote_fields_parse_from_strings() {
        let payload = quote_payload();
        let quote = payload.get("Global Quote").unwrap();

        assert_eq!(str_field(quote, "01. symbol").unwrap(), "AAPL");
        assert_eq!(f64_field(quote, "05. price").unwrap(), 182.31);
        assert_eq!(u64_field(quote, "06. volume").unwrap(), 53_216_400);
        // Trailing '%' must be stripped before parsing.
        assert_eq!(f64_field(quote, "10. change percent").unwrap(), -0.8377);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let payload = json!({ "Global Quote": { "01. symbol": "AAPL" } });
        let quote = payload.get("Global Quote").unwrap();

        let err = f64_field(quote, "05. price").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedPayload(_)));
    }

    #[test]
    fn test_unparseable_number_is_malformed() {
        let payload = json!({ "Global Quote": { "05. price": "n/a" } });
        let quote = payload.get("Global Quote").unwrap();

        let err = f64_field(quote, "05. price").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedPayload(_)));
    }
}
