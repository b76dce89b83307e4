use reqwest::{Client, ClientBuilder, RequestBuilder};
use std::{sync::Arc, time::Duration};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::{node::TransportError, types::NodeAuth};

/// Configuration for HTTP client concurrency and timeout behavior.
///
/// Controls semaphore-based concurrency limiting with adaptive timeouts
/// based on permit availability.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum number of concurrent HTTP requests allowed
    pub concurrent_limit: usize,
    /// Permit acquisition timeout in milliseconds under normal load
    pub permit_timeout_ms: u64,
    /// Permit acquisition timeout in milliseconds when permits are scarce
    pub permit_timeout_scarce_ms: u64,
    /// Number of available permits below which they are considered scarce
    pub scarce_permit_threshold: usize,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: 64,
            permit_timeout_ms: 2000,
            permit_timeout_scarce_ms: 500,
            scarce_permit_threshold: 8,
            request_timeout_ms: 10_000,
        }
    }
}

/// HTTP client shared by every HTTP-backed transport.
///
/// A single semaphore bounds concurrent requests across all endpoints. Transient failures
/// (HTTP 5xx and network errors) are retried twice with exponential backoff before the
/// error reaches the fallback chain.
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
    config: HttpClientConfig,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("available_permits", &self.concurrent_limit.available_permits())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// RAII guard ensuring semaphore permits are always released.
struct PermitGuard {
    _permit: OwnedSemaphorePermit,
    semaphore: Arc<Semaphore>,
}

impl PermitGuard {
    fn new(permit: OwnedSemaphorePermit, semaphore: Arc<Semaphore>) -> Self {
        Self { _permit: permit, semaphore }
    }

    fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        tracing::trace!(
            available_permits = self.semaphore.available_permits(),
            "permit guard dropped"
        );
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Creates a new HTTP client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the reqwest client fails to build.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::limited(3))
            .user_agent(concat!("nodelink/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                TransportError::ClientBuild(Self::sanitize_network_error(&e))
            })?;

        Ok(Self {
            client,
            concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit)),
            config,
        })
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.config.request_timeout_ms)
    }

    /// Sanitizes network errors so URLs and credentials never reach error messages.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else if error.is_redirect() {
            "too many redirects".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// Sends a JSON body with HTTP POST, attaching basic auth when credentials are given.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Timeout`] if permit acquisition or the request times out
    /// - [`TransportError::ConcurrencyLimit`] if the semaphore is closed
    /// - [`TransportError::HttpStatus`] for non-success HTTP status codes
    /// - [`TransportError::ConnectionFailed`] for network failures after retries
    pub async fn post_json(
        &self,
        url: &str,
        body: bytes::Bytes,
        auth: Option<&NodeAuth>,
    ) -> Result<bytes::Bytes, TransportError> {
        let timeout = self.request_timeout();
        self.execute(url, || {
            // Bytes::clone() is a refcount bump, so retries do not copy the body
            let request = self
                .client
                .post(url)
                .header("content-type", "application/json")
                .body(body.clone())
                .timeout(timeout);
            match auth {
                Some(auth) => request.basic_auth(&auth.username, Some(&auth.password)),
                None => request,
            }
        })
        .await
    }

    /// Sends an HTTP GET with the given query parameters.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::post_json`].
    pub async fn get_query(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<bytes::Bytes, TransportError> {
        let timeout = self.request_timeout();
        self.execute(url, || self.client.get(url).query(query).timeout(timeout)).await
    }

    async fn acquire_permit(&self, url: &str) -> Result<PermitGuard, TransportError> {
        let permit_timeout =
            if self.concurrent_limit.available_permits() < self.config.scarce_permit_threshold {
                Duration::from_millis(self.config.permit_timeout_scarce_ms)
            } else {
                Duration::from_millis(self.config.permit_timeout_ms)
            };

        let permit = tokio::time::timeout(
            permit_timeout,
            Arc::clone(&self.concurrent_limit).acquire_owned(),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                host = host_of(url),
                available_permits = self.concurrent_limit.available_permits(),
                "http client semaphore acquisition timeout"
            );
            TransportError::Timeout
        })?
        .map_err(|_| {
            tracing::warn!(host = host_of(url), "http client semaphore closed");
            TransportError::ConcurrencyLimit
        })?;

        Ok(PermitGuard::new(permit, Arc::clone(&self.concurrent_limit)))
    }

    async fn execute<F>(&self, url: &str, build: F) -> Result<bytes::Bytes, TransportError>
    where
        F: Fn() -> RequestBuilder,
    {
        const MAX_RETRIES: u32 = 2;

        let permit_guard = self.acquire_permit(url).await?;

        tracing::trace!(
            available_permits = permit_guard.available_permits(),
            "http request started"
        );

        let mut retries = 0;

        loop {
            match build().send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        let result = response.bytes().await.map_err(|e| {
                            TransportError::ConnectionFailed(Self::sanitize_network_error(&e))
                        });
                        tracing::trace!(
                            available_permits = permit_guard.available_permits(),
                            "http request completed"
                        );
                        return result;
                    } else if response.status().is_server_error() && retries < MAX_RETRIES {
                        retries += 1;
                        tracing::debug!(
                            status = response.status().as_u16(),
                            retry = retries,
                            "retrying after server error"
                        );
                        tokio::time::sleep(Duration::from_millis(100 * (1 << retries))).await;
                        continue;
                    }

                    let status = response.status().as_u16();
                    let raw_text = response.text().await.unwrap_or_default();
                    let sanitized_text = truncate_body(raw_text);
                    tracing::trace!(
                        status = status,
                        available_permits = permit_guard.available_permits(),
                        "http request failed"
                    );
                    return Err(TransportError::HttpStatus(status, sanitized_text));
                }
                Err(e) if retries < MAX_RETRIES && !e.is_builder() => {
                    retries += 1;
                    tracing::debug!(retry = retries, "retrying after network error");
                    tokio::time::sleep(Duration::from_millis(100 * (1 << retries))).await;
                }
                Err(e) => {
                    tracing::trace!(
                        available_permits = permit_guard.available_permits(),
                        "http request error"
                    );
                    if e.is_timeout() {
                        return Err(TransportError::Timeout);
                    }
                    return Err(TransportError::ConnectionFailed(Self::sanitize_network_error(&e)));
                }
            }
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}

fn truncate_body(raw_text: String) -> String {
    const LIMIT: usize = 256;
    if raw_text.len() <= LIMIT {
        return raw_text;
    }
    let mut end = LIMIT;
    while !raw_text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &raw_text[..end])
}

/// Host portion of a URL for log fields, dropping path, query and userinfo.
pub(crate) fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "invalid-url".to_string())
}
