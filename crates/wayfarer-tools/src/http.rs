//! # HTTP Helpers
//!
//! JSON GET helper used by tools that talk to web APIs. Requests run on
//! the caller's runtime with a per-request timeout.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use wayfarer_core::tool::FailureReason;

/// Default timeout for tool HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// GET `url` and decode the body as JSON.
///
/// A 404 maps to [`FailureReason::NotFound`]; other non-2xx statuses and
/// transport errors map to network or timeout failures.
pub async fn get_json(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    timeout: Duration,
) -> Result<Value, FailureReason> {
    let started = std::time::Instant::now();
    let response = client
        .get(url)
        .query(query)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| request_failure(url, e))?;

    let status = response.status();
    tracing::debug!(
        url,
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "HTTP GET completed"
    );

    if status == StatusCode::NOT_FOUND {
        return Err(FailureReason::NotFound {
            message: format!("Resource not found: {}", url),
        });
    }
    if !status.is_success() {
        tracing::warn!(url, status = status.as_u16(), "HTTP GET returned error status");
        return Err(FailureReason::NetworkError {
            message: format!("{} returned HTTP {}", url, status.as_u16()),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| FailureReason::InvalidInput {
            message: format!("Invalid JSON from {}: {}", url, e),
        })
}

fn request_failure(url: &str, error: reqwest::Error) -> FailureReason {
    tracing::warn!(url, error = %error, "HTTP GET failed");
    if error.is_timeout() {
        FailureReason::Timeout {
            operation: format!("GET {}", url),
        }
    } else {
        FailureReason::NetworkError {
            message: format!("HTTP request failed: {}", error),
        }
    }
}
