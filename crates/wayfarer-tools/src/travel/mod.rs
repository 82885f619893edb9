//! # Travel Tool
//!
//! `travel_info` answers "what currency will I need there, and at what rate"
//! for a fixed origin country. Lookups go through a [`CurrencyService`].

pub mod currency;

pub use currency::{
    CurrencyInfo, CurrencyService, FIXER_API_URL, HttpCurrencyService, RESTCOUNTRIES_URL,
    TravelConfig, cross_rate,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use wayfarer_core::tool::{
    Arguments, ExecutionResult, FailureReason, MethodSpec, ParamKind, ParamSpec, Tool,
};

/// Short name the travel tool is registered under.
pub const TRAVEL_TOOL_NAME: &str = "travel_info";

/// Destination currency facts relative to the origin country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelResult {
    pub country_from: String,
    pub country_to: String,
    pub code_from: String,
    pub code_to: String,
    pub currency_name: String,
    pub exchange_rate: f64,
}

/// Travel currency tool for one origin country.
///
/// The origin currency code is looked up on first use and cached for the
/// lifetime of the tool.
pub struct TravelInfo {
    country_from: String,
    service: Arc<dyn CurrencyService>,
    code_from: OnceLock<String>,
}

impl TravelInfo {
    pub fn new(country_from: impl Into<String>, service: Arc<dyn CurrencyService>) -> Self {
        Self {
            country_from: country_from.into(),
            service,
            code_from: OnceLock::new(),
        }
    }

    /// Tool backed by the RestCountries and Fixer web APIs.
    pub fn with_http(country_from: impl Into<String>, config: TravelConfig) -> Self {
        Self::new(country_from, Arc::new(HttpCurrencyService::new(config)))
    }

    pub fn country_from(&self) -> &str {
        &self.country_from
    }

    async fn origin_code(&self) -> Result<String, FailureReason> {
        if let Some(code) = self.code_from.get() {
            return Ok(code.clone());
        }

        let currency = self.service.country_currency(&self.country_from).await?;
        tracing::debug!(
            country = %self.country_from,
            code = %currency.currency_code,
            "Resolved origin currency"
        );
        // A concurrent first call may have won the race; either value is the same code.
        Ok(self.code_from.get_or_init(|| currency.currency_code).clone())
    }

    /// Currency and exchange rate for travelling to `country_to`.
    pub async fn get_info(&self, country_to: &str) -> Result<TravelResult, FailureReason> {
        let currency = self.service.country_currency(country_to).await?;
        let code_from = self.origin_code().await?;
        let exchange_rate = self
            .service
            .exchange_rate(&code_from, &currency.currency_code)
            .await?;

        Ok(TravelResult {
            country_from: self.country_from.clone(),
            country_to: country_to.to_string(),
            code_from,
            code_to: currency.currency_code,
            currency_name: currency.currency_name,
            exchange_rate,
        })
    }
}

#[async_trait]
impl Tool for TravelInfo {
    fn methods(&self) -> Vec<MethodSpec> {
        vec![
            MethodSpec::new("get_info")
                .with_description("Currency and exchange rate for a destination country")
                .with_param(ParamSpec::required("country_to", ParamKind::String)),
        ]
    }

    async fn call(&self, method: &str, arguments: &Arguments) -> ExecutionResult {
        match method {
            "get_info" => {
                let Some(country_to) = arguments.get("country_to").and_then(Value::as_str) else {
                    return ExecutionResult::failed(FailureReason::InvalidInput {
                        message: "country_to must be a string".to_string(),
                    });
                };

                let result = self.get_info(country_to).await.and_then(|info| {
                    serde_json::to_string(&info).map_err(|e| FailureReason::InternalError {
                        message: format!("Failed to serialize travel result: {}", e),
                    })
                });
                match result {
                    Ok(text) => ExecutionResult::text(text),
                    Err(reason) => ExecutionResult::failed(reason),
                }
            }
            other => ExecutionResult::failed(FailureReason::InvalidInput {
                message: format!("Unknown travel_info method: {}", other),
            }),
        }
    }
}
