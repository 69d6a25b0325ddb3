//! OData transport client implementation.

use crate::auth::Credential;
use crate::config::ODataConfig;
use crate::errors::ODataResult;
use crate::resilience::RetryPolicy;
use crate::transport::{HttpTransport, ReqwestTransport};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

mod executor;
pub use executor::RequestExecutor;

/// OData transport client.
///
/// Issues GET/POST/PATCH/DELETE requests against an OData service, decodes
/// JSON responses, and translates failures into [`crate::errors::ODataError`].
/// URLs are absolute and fully resolved by the caller; query construction and
/// entity mapping live above this layer.
///
/// The client holds no mutable state beyond the immutable base headers and
/// retry policy, so one instance may be shared freely across tasks.
///
/// # Example
///
/// ```no_run
/// use odata_client::{ODataClient, BearerCredential};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ODataClient::builder()
///     .credential(BearerCredential::from_string("token"))
///     .build()?;
///
/// let url = Url::parse("https://services.example.com/odata/People")?;
/// if let Some(data) = client.get(url, Some(&[("$top", "5")])).await? {
///     println!("{}", data);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ODataClient {
    /// Configuration.
    config: ODataConfig,
    /// Request executor (headers, dispatch, error translation).
    executor: Arc<RequestExecutor>,
}

impl ODataClient {
    /// Creates a client with the given configuration, a default pooled
    /// transport bound to the configured retry policy, and no credential.
    pub fn new(config: ODataConfig) -> ODataResult<Self> {
        Self::with_parts(config, None, None)
    }

    /// Creates a new client builder.
    pub fn builder() -> ODataClientBuilder {
        ODataClientBuilder::new()
    }

    fn with_parts(
        config: ODataConfig,
        transport: Option<Arc<dyn HttpTransport>>,
        credential: Option<Arc<dyn Credential>>,
    ) -> ODataResult<Self> {
        config.validate()?;

        let transport = match transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config)?),
        };

        let executor = Arc::new(RequestExecutor::new(
            config.clone(),
            transport,
            credential,
        ));

        Ok(Self { config, executor })
    }

    /// Issues a GET request and returns the decoded JSON body, or `None` for
    /// an explicit no-content success.
    pub async fn get(
        &self,
        url: Url,
        params: Option<&[(&str, &str)]>,
    ) -> ODataResult<Option<Value>> {
        self.executor.execute_get(url, params).await
    }

    /// Issues a POST request with a JSON-serialized body. Returns `None`
    /// when the service responds without a JSON body, as OData Actions may.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
        params: Option<&[(&str, &str)]>,
    ) -> ODataResult<Option<Value>> {
        self.executor.execute_post(url, body, params).await
    }

    /// Issues a PATCH request with a JSON-serialized body.
    pub async fn patch<T: Serialize + ?Sized>(&self, url: Url, body: &T) -> ODataResult<()> {
        self.executor.execute_patch(url, body).await
    }

    /// Issues a DELETE request.
    pub async fn delete(&self, url: Url) -> ODataResult<()> {
        self.executor.execute_delete(url).await
    }

    /// Gets the configuration.
    pub fn config(&self) -> &ODataConfig {
        &self.config
    }
}

/// Builder for [`ODataClient`].
///
/// Accepts an optional pre-built transport (for caller-controlled pooling or
/// mocking) and an optional credential, mirroring the two construction knobs
/// of the transport layer. When no transport is supplied the client creates
/// a pooled one bound to the retry policy.
pub struct ODataClientBuilder {
    config: crate::config::ODataConfigBuilder,
    credential: Option<Arc<dyn Credential>>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ODataClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: ODataConfig::builder(),
            credential: None,
            transport: None,
        }
    }

    /// Sets the credential attached to every outgoing request.
    pub fn credential<C: Credential + 'static>(mut self, credential: C) -> Self {
        self.credential = Some(Arc::new(credential));
        self
    }

    /// Sets the credential from an Arc.
    pub fn credential_arc(mut self, credential: Arc<dyn Credential>) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Supplies a pre-built transport, bypassing the default pooled
    /// transport and its built-in retry.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the per-attempt request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config = self.config.user_agent(ua);
        self
    }

    /// Sets the retry policy for the default transport.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config = self.config.retry(retry);
        self
    }

    /// Builds the client.
    pub fn build(self) -> ODataResult<ODataClient> {
        let config = self.config.build()?;
        ODataClient::with_parts(config, self.transport, self.credential)
    }
}

impl Default for ODataClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
