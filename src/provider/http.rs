//! Shared HTTP client and status mapping.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::error::GenbindError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Build headers for the Gemini API (x-goog-api-key).
pub fn google_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(api_key) {
        headers.insert("x-goog-api-key", val);
    }
    headers
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> GenbindError {
    match status {
        401 | 403 => GenbindError::Authentication(body.to_string()),
        429 => GenbindError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => GenbindError::api(status, body),
    }
}

/// Read the `RetryInfo.retryDelay` detail (e.g. `"12s"` or `"0.5s"`) from a
/// Google API error body.
fn extract_retry_after(body: &str) -> Option<u64> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    value
        .get("error")?
        .get("details")?
        .as_array()?
        .iter()
        .filter_map(|detail| detail.get("retryDelay")?.as_str())
        .find_map(|delay| delay.strip_suffix('s')?.parse::<f64>().ok())
        .map(|secs| (secs * 1000.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_reads_retry_delay() {
        let body = r#"{"error":{"code":429,"details":[{"@type":"type.googleapis.com/google.rpc.RetryInfo","retryDelay":"1.5s"}]}}"#;

        match status_to_error(429, body) {
            GenbindError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, Some(1500)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn auth_and_server_statuses_map_to_categories() {
        assert!(matches!(status_to_error(403, "no"), GenbindError::Authentication(_)));
        assert!(status_to_error(503, "down").is_retryable());
        assert!(!status_to_error(400, "bad").is_retryable());
    }
}
