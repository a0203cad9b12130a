use std::time::Duration;

use futures_util::StreamExt;
use pricewatch_logging::{scrape_debug, scrape_warn};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::Url;

use crate::decode::decode_html;
use crate::retry::{parse_retry_after, RetryPolicy};
use crate::{FailureKind, FetchError, FetchOutcome, FetchedPage};

/// Fixed desktop browser identity; keeps the simplest bot filters quiet.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
            redirect_limit: 10,
            max_bytes: 5 * 1024 * 1024,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url`, retrying transient failures internally.
    async fn get(&self, url: &str) -> FetchOutcome;
}

/// HTTP client with a single connection pool and bounded retry.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    retry: RetryPolicy,
    client: reqwest::Client,
}

/// A failed attempt, plus any server hint about when to come back.
struct AttemptFailure {
    error: FetchError,
    retry_after: Option<Duration>,
}

impl From<FetchError> for AttemptFailure {
    fn from(error: FetchError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings, retry: RetryPolicy) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            retry,
            client,
        })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn attempt(&self, url: &Url, attempt: u32) -> Result<FetchedPage, AttemptFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(parse_retry_after);
            return Err(AttemptFailure {
                error: FetchError::new(
                    FailureKind::HttpStatus(status.as_u16()),
                    status.canonical_reason().unwrap_or_default(),
                ),
                retry_after,
            });
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len).into());
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len).into());
            }
            bytes.extend_from_slice(&chunk);
        }

        let decoded = decode_html(&bytes, content_type.as_deref());
        if decoded.had_errors {
            scrape_debug!(
                "Replaced undecodable bytes in {} ({})",
                final_url,
                decoded.encoding_label
            );
        }

        Ok(FetchedPage {
            body: decoded.html,
            final_url,
            status: status.as_u16(),
            attempts: attempt,
            encoding_label: decoded.encoding_label,
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> FetchOutcome {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                return FetchOutcome::TransientFailure(FetchError::new(
                    FailureKind::InvalidUrl,
                    err.to_string(),
                ))
            }
        };

        let max_attempts = self.retry.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            scrape_debug!("GET {} attempt {}/{}", url, attempt, max_attempts);

            let failure = match self.attempt(&parsed, attempt).await {
                Ok(page) => return FetchOutcome::Success(page),
                Err(failure) => failure,
            };

            if failure.error.kind == FailureKind::HttpStatus(404) {
                return FetchOutcome::NotFound;
            }
            if attempt >= max_attempts || !self.retry.is_retryable(&failure.error.kind) {
                return FetchOutcome::TransientFailure(failure.error.with_attempts(attempt));
            }

            let delay = self
                .retry
                .delay_for(attempt, &failure.error.kind, failure.retry_after);
            scrape_warn!(
                "GET {} failed: {}; retrying in {:?}",
                url,
                failure.error,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    if err.is_builder() {
        return FetchError::new(FailureKind::InvalidUrl, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
