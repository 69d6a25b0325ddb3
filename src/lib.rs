//! OData HTTP Transport Client
//!
//! This crate is the HTTP transport layer of an OData client: it issues
//! GET/POST/PATCH/DELETE requests against an OData v4 service, negotiates
//! JSON content, retries transient server failures, and translates both
//! transport failures and OData error payloads into a uniform error model.
//!
//! # Features
//!
//! - **Verb entry points**: `get`, `post`, `patch`, `delete` over absolute,
//!   caller-resolved URLs
//! - **Retry**: transient failure statuses (429, 500, 502, 503, 504) retried
//!   transparently with exponential backoff
//! - **Error taxonomy**: transport failures vs. structured OData protocol
//!   errors, individually inspectable
//! - **Credentials**: basic, bearer, or caller-supplied request decoration
//! - **Transport injection**: bring your own connection pool or mock
//!
//! Query construction, entity mapping, schema parsing, and pagination are
//! the business of the layers above; this crate returns raw decoded JSON.
//!
//! # Example
//!
//! ```no_run
//! use odata_client::{ODataClient, BasicCredential};
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ODataClient::builder()
//!     .credential(BasicCredential::from_strings("user", "pass"))
//!     .build()?;
//!
//! let url = Url::parse("https://services.example.com/odata/People")?;
//! let people = client.get(url, None).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod resilience;
pub mod transport;

// Re-exports for convenience
pub use auth::{BasicCredential, BearerCredential, Credential};
pub use client::{ODataClient, ODataClientBuilder};
pub use config::{ODataConfig, ODataConfigBuilder};
pub use errors::{ODataError, ODataResult, ProtocolError, TransportError};
pub use resilience::RetryPolicy;

/// Prelude module with commonly used types and traits.
///
/// ```no_run
/// use odata_client::prelude::*;
/// ```
pub mod prelude {
    // Client
    pub use crate::client::{ODataClient, ODataClientBuilder};

    // Configuration
    pub use crate::config::{ODataConfig, ODataConfigBuilder};
    pub use crate::resilience::RetryPolicy;

    // Credentials
    pub use crate::auth::{BasicCredential, BearerCredential, Credential};

    // Transport seam
    pub use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

    // Errors
    pub use crate::errors::{ODataError, ODataResult, ProtocolError, TransportError};
}
