//! HTTP transport layer.
//!
//! [`HttpTransport`] is the seam between the client and the wire: the
//! default [`ReqwestTransport`] owns a pooled `reqwest::Client` and applies
//! the configured retry policy to transient failure statuses. An injected
//! transport (for caller-controlled pooling or mocking) bypasses the
//! built-in retry.

use crate::config::ODataConfig;
use crate::errors::TransportError;
use crate::resilience::RetryPolicy;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;
use url::Url;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
    /// PATCH request.
    Patch,
    /// DELETE request.
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// HTTP request representation. Built fresh per call and consumed by one
/// dispatch.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute request URL, query included.
    pub url: Url,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<Bytes>,
    /// Timeout for each underlying attempt.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a new request with no headers or body.
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns the content-type header value, or an empty string.
    pub fn content_type(&self) -> &str {
        self.headers
            .get("content-type")
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// HTTP transport abstraction.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and receive a response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Reqwest-based HTTP transport with status-code retries.
///
/// Retries fire only on the policy's retryable statuses; transport
/// exceptions surface immediately, and responses outside the retryable set
/// are returned as-is for the caller to interpret. Each retry awaits the
/// policy's exponential backoff.
pub struct ReqwestTransport {
    client: Client,
    retry: RetryPolicy,
}

impl ReqwestTransport {
    /// Creates a transport from the client configuration.
    pub fn new(config: &ODataConfig) -> Result<Self, TransportError> {
        let mut builder = ClientBuilder::new()
            .pool_max_idle_per_host(config.pool.max_idle_per_host);

        if let Some(keepalive) = config.pool.keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            retry: config.retry.clone(),
        })
    }

    /// Creates a transport from an existing `reqwest::Client`.
    pub fn with_client(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone());

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(TransportError::from)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response.bytes().await.map_err(TransportError::from)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut attempt = 1;

        loop {
            let response = self.execute(&request).await?;

            if attempt < self.retry.max_attempts
                && self.retry.is_retryable_status(response.status.as_u16())
            {
                let delay = self.retry.backoff(attempt);
                tracing::info!(
                    status = response.status.as_u16(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying on transient status"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Ok(response);
        }
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("retry", &self.retry)
            .finish()
    }
}
