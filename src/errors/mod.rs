//! Error types for the OData transport client.

use thiserror::Error;

/// Result type for OData transport operations.
pub type ODataResult<T> = Result<T, ODataError>;

/// Top-level error type for the OData transport client.
///
/// Every failing call surfaces exactly one of [`Transport`], [`Protocol`],
/// or [`UnsupportedContentType`]: a transport failure before any HTTP
/// response was obtained, a protocol-level error carried in a failure-status
/// response, or a successful response whose content-type the client cannot
/// interpret. [`Configuration`] arises only at client construction.
///
/// [`Transport`]: ODataError::Transport
/// [`Protocol`]: ODataError::Protocol
/// [`UnsupportedContentType`]: ODataError::UnsupportedContentType
/// [`Configuration`]: ODataError::Configuration
#[derive(Debug, Error)]
pub enum ODataError {
    /// Connection-level failure (DNS, TLS, timeout, reset).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// HTTP failure status with an OData error payload.
    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    /// Successful status but a content-type the client cannot decode.
    #[error("Unsupported response Content-Type: {content_type}")]
    UnsupportedContentType {
        /// The offending content-type header value.
        content_type: String,
    },

    /// Invalid client configuration. Surfaced at construction, never by a
    /// dispatched call.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ODataError {
    /// Creates an unsupported content-type error.
    pub fn unsupported_content_type(content_type: impl Into<String>) -> Self {
        ODataError::UnsupportedContentType {
            content_type: content_type.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        ODataError::Configuration(msg.into())
    }
}

/// Transport errors: failures that occur before an HTTP response exists.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed (DNS, TLS, refused, reset).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Other HTTP-level transport failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Request body could not be serialized or a response body claiming
    /// JSON could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// Structured OData protocol error extracted from a failure-status response.
///
/// The four components are individually accessible; the display string joins
/// them with `" | "`, e.g. `HTTP 500 | E1 | bad | None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status_line} | {code} | {message} | {detailed_message}")]
pub struct ProtocolError {
    /// Status line, recorded verbatim as `HTTP <code>`.
    pub status_line: String,
    /// Machine error code, or [`ProtocolError::NO_CODE`].
    pub code: String,
    /// Human-readable message, or [`ProtocolError::NO_MESSAGE`].
    pub message: String,
    /// Detailed inner message, or [`ProtocolError::NO_DETAILED_MESSAGE`].
    pub detailed_message: String,
}

impl ProtocolError {
    /// Sentinel used when the server supplied no error code.
    pub const NO_CODE: &'static str = "None";
    /// Sentinel used when the server supplied no error message.
    pub const NO_MESSAGE: &'static str = "Server did not supply any error messages";
    /// Sentinel used when the server supplied no inner error message.
    pub const NO_DETAILED_MESSAGE: &'static str = "None";

    /// Creates a protocol error for a status code with all fields at their
    /// sentinel values.
    pub fn from_status(status: u16) -> Self {
        Self {
            status_line: format!("HTTP {}", status),
            code: Self::NO_CODE.to_string(),
            message: Self::NO_MESSAGE.to_string(),
            detailed_message: Self::NO_DETAILED_MESSAGE.to_string(),
        }
    }
}
