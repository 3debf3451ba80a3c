//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvest, including:
//! - Building the HTTP client with the configured user agent
//! - GET requests for listing and detail pages
//! - Bounded retry with backoff for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, SiteConfig};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Errors produced while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// A non-success status that is not worth retrying
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// A transport-level failure that is not worth retrying
    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    /// Transient failures kept recurring until the retry budget ran out
    #[error("Gave up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

/// Retry behavior for transient fetch failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts allowed beyond the first
    pub max_retries: u32,
    /// Base delay; attempt N waits N times this
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `site` - Target site configuration (user agent)
/// * `crawler` - Crawler configuration (timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    site: &SiteConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(site.user_agent.clone())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body, retrying transient failures with linear backoff
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return body |
/// | HTTP 429 | Retry up to `max_retries` times |
/// | HTTP 5xx | Retry up to `max_retries` times |
/// | Timeout | Retry up to `max_retries` times |
/// | Connection error | Retry up to `max_retries` times |
/// | Any other status | Immediate failure |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `retry` - Retry budget and backoff base
///
/// # Returns
///
/// * `Ok(String)` - The response body
/// * `Err(FetchError)` - Classification of the final failure
pub async fn fetch_html(client: &Client, url: &Url, retry: RetryPolicy) -> Result<String, FetchError> {
    let mut last_error = String::new();

    for attempt in 0..=retry.max_retries {
        if attempt > 0 {
            let delay = retry.backoff * attempt;
            debug!(
                "Retry {}/{} for {} after {:?}",
                attempt, retry.max_retries, url, delay
            );
            tokio::time::sleep(delay).await;
        }

        match client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response.text().await.map_err(|source| FetchError::Transport {
                        url: url.to_string(),
                        source,
                    });
                }

                if is_retryable_status(status) {
                    warn!("HTTP {} from {}, will retry", status.as_u16(), url);
                    last_error = format!("HTTP {}", status.as_u16());
                    continue;
                }

                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            Err(e) if e.is_timeout() || e.is_connect() => {
                warn!("Request to {} failed ({}), will retry", url, e);
                last_error = e.to_string();
                continue;
            }

            Err(source) => {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    source,
                });
            }
        }
    }

    Err(FetchError::RetriesExhausted {
        url: url.to_string(),
        attempts: retry.max_retries + 1,
        last_error,
    })
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_configs() -> (SiteConfig, CrawlerConfig) {
        (
            SiteConfig {
                start_url: "https://books.example.com/".to_string(),
                currency_symbol: "£".to_string(),
                user_agent: "shelf-sweep-test/0.1".to_string(),
            },
            CrawlerConfig {
                fetch_workers: 2,
                queue_capacity: 16,
                max_retries: 2,
                retry_backoff_ms: 100,
                request_timeout_secs: 5,
            },
        )
    }

    #[test]
    fn test_build_http_client() {
        let (site, crawler) = test_configs();
        let client = build_http_client(&site, &crawler);
        assert!(client.is_ok());
    }

    #[test]
    fn test_retryable_status_classification() {
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));

        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
        assert!(!is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn test_retry_policy_from_config() {
        let (_, crawler) = test_configs();
        let policy = RetryPolicy::from_config(&crawler);
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.backoff, Duration::from_millis(100));
    }

    // Behavior under real responses is covered by the wiremock scenarios in
    // the integration tests.
}
