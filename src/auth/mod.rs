//! Credentials for OData services.
//!
//! The client never inspects credential contents; a credential is a
//! capability with one operation, decorating the outgoing request headers.
//! Basic and bearer variants are provided; callers with custom signing
//! schemes implement [`Credential`] themselves.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

/// Credential abstraction: decorates outgoing request headers.
pub trait Credential: Send + Sync {
    /// Apply authentication to request headers.
    fn apply(&self, headers: &mut HashMap<String, String>);

    /// Get the authentication scheme name.
    fn scheme(&self) -> &str;
}

/// HTTP basic authentication credential.
pub struct BasicCredential {
    username: String,
    password: SecretString,
}

impl BasicCredential {
    /// Creates a new basic auth credential.
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Creates a basic auth credential from plain strings.
    pub fn from_strings(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(username, SecretString::new(password.into()))
    }
}

impl Credential for BasicCredential {
    fn apply(&self, headers: &mut HashMap<String, String>) {
        let pair = format!("{}:{}", self.username, self.password.expose_secret());
        headers.insert(
            "Authorization".to_string(),
            format!("Basic {}", BASE64.encode(pair)),
        );
    }

    fn scheme(&self) -> &str {
        "Basic"
    }
}

impl std::fmt::Debug for BasicCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Bearer token credential.
pub struct BearerCredential {
    token: SecretString,
}

impl BearerCredential {
    /// Creates a new bearer token credential.
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }

    /// Creates a bearer token credential from a plain string.
    pub fn from_string(token: impl Into<String>) -> Self {
        Self::new(SecretString::new(token.into()))
    }
}

impl Credential for BearerCredential {
    fn apply(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.token.expose_secret()),
        );
    }

    fn scheme(&self) -> &str {
        "Bearer"
    }
}

impl std::fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerCredential")
            .field("token", &"[REDACTED]")
            .finish()
    }
}
