//! Agent configuration from the process environment.

use crate::error::ConfigError;
use std::env;
use std::time::Duration;

pub const API_URL_ENV: &str = "PHI3_API_URL";
pub const MODEL_ENV: &str = "PHI3_MODEL_NAME";
pub const TIMEOUT_ENV: &str = "WAYFARER_LLM_TIMEOUT_SECS";
pub const COUNTRY_FROM_ENV: &str = "WAYFARER_COUNTRY_FROM";
pub const CURRENCY_FROM_ENV: &str = "WAYFARER_CURRENCY_FROM";

/// Default model request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default origin country for travel questions.
pub const DEFAULT_COUNTRY_FROM: &str = "Israel";

/// Currency code of [`DEFAULT_COUNTRY_FROM`].
pub const DEFAULT_CURRENCY_FROM: &str = "ILS";

/// Settings for the model client and the travel assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Chat endpoint receiving the full transcript.
    pub api_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    pub request_timeout: Duration,
    /// Country the user travels from.
    pub country_from: String,
    /// Currency code of `country_from`, stated in the system prompt when known.
    pub currency_from: Option<String>,
}

impl AgentConfig {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            model: model.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            country_from: DEFAULT_COUNTRY_FROM.to_string(),
            currency_from: Some(DEFAULT_CURRENCY_FROM.to_string()),
        }
    }

    /// Load from environment variables.
    ///
    /// `PHI3_API_URL` and `PHI3_MODEL_NAME` are required; the timeout,
    /// origin country and origin currency variables are optional. Changing
    /// the origin country without naming its currency leaves the currency
    /// unknown.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingVar {
                name: name.to_string(),
            }),
        };

        let mut config = Self::new(required(API_URL_ENV)?, required(MODEL_ENV)?);

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidVar {
                    name: TIMEOUT_ENV.to_string(),
                    reason: format!("expected a positive number of seconds, got '{}'", raw),
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(country) = lookup(COUNTRY_FROM_ENV)
            && !country.trim().is_empty()
            && country.trim() != config.country_from
        {
            config.country_from = country.trim().to_string();
            config.currency_from = None;
        }

        if let Some(code) = lookup(CURRENCY_FROM_ENV)
            && !code.trim().is_empty()
        {
            config.currency_from = Some(code.trim().to_uppercase());
        }

        Ok(config)
    }
}
