//! Country currency lookup and exchange rates.
//!
//! Currency data comes from the RestCountries API and rates from Fixer.
//! Both are reached through [`CurrencyService`] so the travel tool can run
//! against stubs in tests.

use crate::http::{DEFAULT_TIMEOUT, get_json};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::time::Duration;
use wayfarer_core::tool::FailureReason;

pub const RESTCOUNTRIES_URL: &str = "https://restcountries.com/v3.1/name/";
pub const FIXER_API_URL: &str = "http://data.fixer.io/api/latest";

/// Currency used in a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// ISO code, e.g. `JPY`.
    pub currency_code: String,
    /// Display name, e.g. `Japanese yen`.
    pub currency_name: String,
}

/// Source of currency facts for the travel tool.
#[async_trait]
pub trait CurrencyService: Send + Sync {
    /// Currency used in `country`.
    async fn country_currency(&self, country: &str) -> Result<CurrencyInfo, FailureReason>;

    /// Units of `code_to` per one unit of `code_from`, rounded to 2 decimals.
    async fn exchange_rate(&self, code_from: &str, code_to: &str) -> Result<f64, FailureReason>;
}

/// Endpoints and credentials for [`HttpCurrencyService`].
#[derive(Debug, Clone)]
pub struct TravelConfig {
    pub countries_url: String,
    pub rates_url: String,
    pub fixer_api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            countries_url: RESTCOUNTRIES_URL.to_string(),
            rates_url: FIXER_API_URL.to_string(),
            fixer_api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TravelConfig {
    /// Defaults overridden by `FIXER_API_KEY`, `WAYFARER_COUNTRIES_URL` and
    /// `WAYFARER_RATES_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = env::var("FIXER_API_KEY")
            && !key.trim().is_empty()
        {
            config.fixer_api_key = Some(key);
        }
        if let Ok(url) = env::var("WAYFARER_COUNTRIES_URL") {
            config.countries_url = url;
        }
        if let Ok(url) = env::var("WAYFARER_RATES_URL") {
            config.rates_url = url;
        }

        config
    }

    pub fn with_countries_url(mut self, url: impl Into<String>) -> Self {
        self.countries_url = url.into();
        self
    }

    pub fn with_rates_url(mut self, url: impl Into<String>) -> Self {
        self.rates_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.fixer_api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// [`CurrencyService`] backed by RestCountries and Fixer.
#[derive(Debug, Clone)]
pub struct HttpCurrencyService {
    client: Client,
    config: TravelConfig,
}

impl HttpCurrencyService {
    pub fn new(config: TravelConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CurrencyService for HttpCurrencyService {
    async fn country_currency(&self, country: &str) -> Result<CurrencyInfo, FailureReason> {
        let url = format!("{}{}", self.config.countries_url, country);
        let data = get_json(&self.client, &url, &[], self.config.timeout)
            .await
            .map_err(|reason| match reason {
                FailureReason::NotFound { .. } => country_not_found(country),
                other => other,
            })?;

        parse_country_currency(country, &data)
    }

    async fn exchange_rate(&self, code_from: &str, code_to: &str) -> Result<f64, FailureReason> {
        let Some(key) = self.config.fixer_api_key.as_deref() else {
            return Err(FailureReason::Configuration {
                message: "Fixer API key not set in environment".to_string(),
            });
        };

        let data = get_json(
            &self.client,
            &self.config.rates_url,
            &[("access_key", key)],
            self.config.timeout,
        )
        .await?;

        parse_exchange_rate(&data, code_from, code_to)
    }
}

fn country_not_found(country: &str) -> FailureReason {
    FailureReason::NotFound {
        message: format!("Country '{}' not found.", country),
    }
}

/// Pull the first currency out of a RestCountries response.
pub fn parse_country_currency(country: &str, data: &Value) -> Result<CurrencyInfo, FailureReason> {
    let Some(country_data) = data.as_array().and_then(|entries| entries.first()) else {
        return Err(country_not_found(country));
    };

    let currencies = match country_data.get("currencies").and_then(Value::as_object) {
        Some(currencies) if !currencies.is_empty() => currencies,
        _ => {
            return Err(FailureReason::NotFound {
                message: format!("No currency information for '{}'.", country),
            });
        }
    };

    // Map order follows the key order of the response document.
    let Some((code, currency)) = currencies.iter().next() else {
        return Err(country_not_found(country));
    };

    match currency.get("name").and_then(Value::as_str) {
        Some(name) => Ok(CurrencyInfo {
            currency_code: code.clone(),
            currency_name: name.to_string(),
        }),
        None => Err(FailureReason::InvalidInput {
            message: format!("Invalid currency structure for '{}'.", country),
        }),
    }
}

/// Compute the cross rate between two currencies from a Fixer response.
pub fn parse_exchange_rate(
    data: &Value,
    code_from: &str,
    code_to: &str,
) -> Result<f64, FailureReason> {
    if !data.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return Err(FailureReason::InternalError {
            message: format!("Fixer API returned an error: {}", data),
        });
    }

    let rates = match data.get("rates").and_then(Value::as_object) {
        Some(rates) if !rates.is_empty() => rates,
        _ => {
            return Err(FailureReason::InternalError {
                message: "Invalid rates data from Fixer API".to_string(),
            });
        }
    };

    let rate_from = rates.get(code_from).and_then(Value::as_f64);
    let rate_to = rates.get(code_to).and_then(Value::as_f64);
    match (rate_from, rate_to) {
        (Some(from), Some(to)) if from != 0.0 => Ok(cross_rate(from, to)),
        _ => Err(FailureReason::NotFound {
            message: format!(
                "Exchange rate not available for {} or {}",
                code_from, code_to
            ),
        }),
    }
}

/// Rate of the target currency per unit of the source, rounded to 2 decimals.
pub fn cross_rate(rate_from: f64, rate_to: f64) -> f64 {
    (rate_to / rate_from * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn cross_rate_rounds_to_two_decimals() {
        assert_eq!(cross_rate(1.0, 3.5), 3.5);
        assert_eq!(cross_rate(4.0, 162.4567), 40.61);
        assert_eq!(cross_rate(3.0, 1.0), 0.33);
    }

    #[test]
    fn parses_first_currency() {
        let data = json!([{"currencies": {"JPY": {"name": "Japanese yen", "symbol": "¥"}}}]);
        let info = parse_country_currency("Japan", &data).unwrap();
        assert_eq!(
            info,
            CurrencyInfo {
                currency_code: "JPY".into(),
                currency_name: "Japanese yen".into()
            }
        );
    }

    #[test]
    fn currency_parse_failures() {
        let empty = parse_country_currency("Atlantis", &json!([])).unwrap_err();
        assert_eq!(empty.message(), "Country 'Atlantis' not found.");

        let no_currencies =
            parse_country_currency("Antarctica", &json!([{"currencies": {}}])).unwrap_err();
        assert_eq!(
            no_currencies.message(),
            "No currency information for 'Antarctica'."
        );

        let bad_shape =
            parse_country_currency("Japan", &json!([{"currencies": {"JPY": {}}}])).unwrap_err();
        assert_eq!(bad_shape.message(), "Invalid currency structure for 'Japan'.");
    }

    #[test]
    fn exchange_rate_failures() {
        let failed = parse_exchange_rate(&json!({"success": false}), "ILS", "JPY").unwrap_err();
        assert!(failed.message().starts_with("Fixer API returned an error"));

        let no_rates = parse_exchange_rate(&json!({"success": true}), "ILS", "JPY").unwrap_err();
        assert_eq!(no_rates.message(), "Invalid rates data from Fixer API");

        let missing = parse_exchange_rate(
            &json!({"success": true, "rates": {"ILS": 4.0}}),
            "ILS",
            "JPY",
        )
        .unwrap_err();
        assert_eq!(missing.message(), "Exchange rate not available for ILS or JPY");
    }

    #[tokio::test]
    async fn http_service_looks_up_country_currency() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/name/Japan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!([{"currencies": {"JPY": {"name": "Japanese yen"}}}]),
            ))
            .mount(&server)
            .await;

        let service = HttpCurrencyService::new(
            TravelConfig::default().with_countries_url(format!("{}/name/", server.uri())),
        );
        let info = service.country_currency("Japan").await.unwrap();
        assert_eq!(info.currency_code, "JPY");
    }

    #[tokio::test]
    async fn http_service_reports_unknown_country() {
        let server = MockServer::start().await;
        Mock::given(path("/name/Atlantis"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let service = HttpCurrencyService::new(
            TravelConfig::default().with_countries_url(format!("{}/name/", server.uri())),
        );
        let err = service.country_currency("Atlantis").await.unwrap_err();
        assert_eq!(err.message(), "Country 'Atlantis' not found.");
    }

    #[tokio::test]
    async fn http_service_computes_exchange_rate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("access_key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "rates": {"ILS": 4.0, "JPY": 162.0}
            })))
            .mount(&server)
            .await;

        let service = HttpCurrencyService::new(
            TravelConfig::default()
                .with_rates_url(format!("{}/latest", server.uri()))
                .with_api_key("k"),
        );
        assert_eq!(service.exchange_rate("ILS", "JPY").await.unwrap(), 40.5);
    }

    #[tokio::test]
    async fn http_service_requires_api_key() {
        let service = HttpCurrencyService::new(TravelConfig::default());
        let err = service.exchange_rate("ILS", "JPY").await.unwrap_err();
        assert_eq!(err.message(), "Fixer API key not set in environment");
    }

    #[tokio::test]
    async fn http_service_reports_slow_lookup_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(path("/name/Japan"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"currencies": {"JPY": {"name": "Japanese yen"}}}]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let service = HttpCurrencyService::new(
            TravelConfig::default()
                .with_countries_url(format!("{}/name/", server.uri()))
                .with_timeout(Duration::from_millis(50)),
        );
        let err = service.country_currency("Japan").await.unwrap_err();
        assert!(matches!(err, FailureReason::Timeout { .. }));
    }
}
