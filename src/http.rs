//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Optional exponential backoff retry for idempotent GETs
//! - Rate limit and server error handling

use crate::error::CheckError;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("alpa-autoupdate/", env!("CARGO_PKG_VERSION"));

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 500;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

/// Outcome of a single attempt
enum Attempt<T> {
    Done(Result<T, CheckError>),
    Retry(CheckError),
}

impl HttpClient {
    /// Create a new HTTP client with default settings and no retries
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            max_retries: 0,
        })
    }

    /// Set the maximum number of retries for GET requests
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Maximum number of retries for GET requests
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// GET a JSON document on behalf of `package`
    ///
    /// 404 maps to `UnknownPackage` for `project`; rate limiting, server
    /// errors and transport failures are retried up to `max_retries` times.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        package: &str,
        project: &str,
    ) -> Result<T, CheckError> {
        let mut delay = BASE_DELAY_MS;
        let mut attempt = 0;

        loop {
            let err = match self.attempt(url.clone(), package, project).await {
                Attempt::Done(result) => return result,
                Attempt::Retry(err) => err,
            };

            if attempt >= self.max_retries {
                return Err(err);
            }

            tracing::debug!(package, attempt, error = %err, "retrying version lookup");
            tokio::time::sleep(Duration::from_millis(delay)).await;
            delay *= 2;
            attempt += 1;
        }
    }

    async fn attempt<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        package: &str,
        project: &str,
    ) -> Attempt<T> {
        tracing::debug!(package, %url, "GET");
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Retry(CheckError::unavailable(package, "request timed out"))
            }
            Err(e) => return Attempt::Retry(CheckError::unavailable(package, e.to_string())),
        };

        let status = response.status();
        tracing::debug!(package, %status, "response");

        if status == StatusCode::NOT_FOUND {
            return Attempt::Done(Err(CheckError::unknown(package, project)));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Attempt::Retry(CheckError::unavailable(package, "rate limit exceeded"));
        }

        if status.is_server_error() {
            return Attempt::Retry(CheckError::unavailable(package, format!("HTTP {}", status)));
        }

        if !status.is_success() {
            return Attempt::Done(Err(CheckError::unavailable(
                package,
                format!("HTTP {}", status),
            )));
        }

        Attempt::Done(response.json::<T>().await.map_err(|e| {
            CheckError::unavailable(package, format!("malformed response: {}", e))
        }))
    }
}
