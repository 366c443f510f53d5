//! HTTP client for the book server.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{ErrorContext, FormatError, LibraryError, LibraryResult, NetworkError};
use crate::models::Book;
use crate::traits::{Headers, HttpClient, HttpError};

/// Outcome of [`BookApiClient::test_connection`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionReport {
    pub success: bool,
    /// `"connected"` or `"disconnected"`.
    pub status: &'static str,
    pub book_count: Option<usize>,
    pub error: Option<String>,
    pub latency: Duration,
    pub timestamp: DateTime<Utc>,
}

/// Static description of the client, returned by [`BookApiClient::health`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiHealth {
    pub status: &'static str,
    pub base_url: String,
    pub timestamp: DateTime<Utc>,
}

/// Fetches the catalog with a per-request timeout and linear-backoff retries.
pub struct BookApiClient<C: HttpClient> {
    client: C,
    config: ApiConfig,
}

impl<C: HttpClient> BookApiClient<C> {
    pub fn new(client: C, config: ApiConfig) -> Self {
        Self { client, config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn books_url(&self) -> String {
        format!("{}{}", self.config.base_url, self.config.books_path)
    }

    pub fn book_url(&self, id: i64) -> String {
        format!("{}{}/{}", self.config.base_url, self.config.book_path, id)
    }

    /// Fetch and normalize the whole catalog.
    ///
    /// Records that are not JSON objects are skipped with a warning; every
    /// other record is kept with defaults filled in.
    pub async fn get_books(&self) -> LibraryResult<Vec<Book>> {
        let url = self.books_url();
        let payload = self.request_json(&url).await?;

        let Value::Array(records) = payload else {
            return Err(FormatError::NotAnArray {
                found: FormatError::kind_of(&payload),
            }
            .into());
        };

        let total = records.len();
        let books: Vec<Book> = records
            .iter()
            .enumerate()
            .filter_map(|(position, record)| match Book::from_value(record, position) {
                Ok(book) => Some(book),
                Err(e) => {
                    tracing::warn!("Skipping book record {}: {}", position, e);
                    None
                }
            })
            .collect();

        tracing::info!("Loaded {} of {} book records from {}", books.len(), total, url);
        Ok(books)
    }

    /// Fetch one book.
    pub async fn get_book_by_id(&self, id: i64) -> LibraryResult<Book> {
        let payload = self.request_json(&self.book_url(id)).await?;
        Ok(Book::from_value(&payload, 0)?)
    }

    /// Probe the book endpoint once, without retries.
    pub async fn test_connection(&self) -> ConnectionReport {
        let started = std::time::Instant::now();
        let url = self.books_url();
        let outcome = self.attempt(&url).await;
        let latency = started.elapsed();

        match outcome {
            Ok(payload) => {
                tracing::info!("Book server reachable at {}", self.config.base_url);
                ConnectionReport {
                    success: true,
                    status: "connected",
                    book_count: payload.as_array().map(Vec::len),
                    error: None,
                    latency,
                    timestamp: Utc::now(),
                }
            }
            Err(e) => {
                tracing::warn!("Book server unreachable at {}: {}", self.config.base_url, e);
                ConnectionReport {
                    success: false,
                    status: "disconnected",
                    book_count: None,
                    error: Some(e.to_string()),
                    latency,
                    timestamp: Utc::now(),
                }
            }
        }
    }

    pub fn health(&self) -> ApiHealth {
        ApiHealth {
            status: "healthy",
            base_url: self.config.base_url.clone(),
            timestamp: Utc::now(),
        }
    }

    /// GET `url` and parse JSON, retrying network failures.
    ///
    /// Attempt `n` that fails waits `retry_delay * n` before the next one.
    /// Format errors are returned at once.
    async fn request_json(&self, url: &str) -> LibraryResult<Value> {
        let attempts = self.config.retry_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match self.attempt(url).await {
                Ok(payload) => return Ok(payload),
                Err(LibraryError::Network(e)) => e,
                Err(other) => {
                    return Err(other.with_context(
                        ErrorContext::new("request_json")
                            .with_component("api_client")
                            .with_detail(url)
                            .with_retry_count(attempt - 1),
                    ))
                }
            };

            if attempt >= attempts || matches!(error, NetworkError::Cancelled) {
                let error = if attempts > 1 {
                    NetworkError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        source: Box::new(error),
                    }
                } else {
                    error
                };
                tracing::error!("GET {} failed: {}", url, error);
                return Err(LibraryError::from(error).with_context(
                    ErrorContext::new("request_json")
                        .with_component("api_client")
                        .with_detail(url)
                        .with_retry_count(attempt - 1),
                ));
            }

            let delay = self.config.retry_delay * attempt;
            tracing::warn!(
                "Attempt {}/{} for {} failed ({}), retrying in {} ms",
                attempt,
                attempts,
                url,
                error,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One GET with the configured timeout.
    async fn attempt(&self, url: &str) -> LibraryResult<Value> {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());

        let timeout = self.config.timeout;
        let response = match tokio::time::timeout(timeout, self.client.get(url, &headers)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(convert_http_error(e, url, timeout).into()),
            Err(_) => {
                return Err(NetworkError::Timeout {
                    operation: format!("GET {}", url),
                    duration_ms: timeout.as_millis() as u64,
                }
                .into())
            }
        };

        if !response.is_success() {
            let message = response
                .text()
                .ok()
                .and_then(|body| error_message_from_body(&body))
                .unwrap_or_else(|| "request failed".to_string());
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message,
            }
            .into());
        }

        let payload: Value = response.json().map_err(FormatError::from)?;
        Ok(payload)
    }
}

fn convert_http_error(err: HttpError, url: &str, timeout: Duration) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message,
        },
        HttpError::Timeout(_) => NetworkError::Timeout {
            operation: format!("GET {}", url),
            duration_ms: timeout.as_millis() as u64,
        },
        HttpError::Cancelled => NetworkError::Cancelled,
        HttpError::InvalidUrl(message) => NetworkError::Other {
            message: format!("invalid URL '{}': {}", url, message),
        },
        HttpError::Other(message) => NetworkError::Other { message },
    }
}

/// Pull `error` out of a `{error, details?}` body, falling back to the raw text.
fn error_message_from_body(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("error")
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| Some(body.to_string())),
        _ => Some(crate::util::truncate_chars(body, 200)),
    }
}
