//! Request executor: header assembly, dispatch, and error translation.

use crate::auth::Credential;
use crate::config::{ODataConfig, ODATA_VERSION};
use crate::errors::{ODataError, ODataResult, ProtocolError, TransportError};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Executes OData requests: assembles headers, attaches the credential,
/// dispatches through the transport, and translates failures.
///
/// Every verb funnels through one dispatch routine and one error-translation
/// routine. A call either yields decoded JSON, yields nothing for an
/// explicit no-content success, or fails with exactly one [`ODataError`].
pub struct RequestExecutor {
    config: ODataConfig,
    transport: Arc<dyn HttpTransport>,
    credential: Option<Arc<dyn Credential>>,
}

impl RequestExecutor {
    /// Creates a new request executor.
    pub fn new(
        config: ODataConfig,
        transport: Arc<dyn HttpTransport>,
        credential: Option<Arc<dyn Credential>>,
    ) -> Self {
        Self {
            config,
            transport,
            credential,
        }
    }

    /// Executes a GET request and returns the decoded JSON body.
    ///
    /// Returns `None` for a no-content success. A successful response with a
    /// non-JSON content-type fails with
    /// [`ODataError::UnsupportedContentType`].
    pub async fn execute_get(
        &self,
        url: Url,
        params: Option<&[(&str, &str)]>,
    ) -> ODataResult<Option<Value>> {
        tracing::debug!(%url, "GET");
        if let Some(params) = params {
            tracing::debug!(?params, "Query");
        }

        let response = self.dispatch(HttpMethod::Get, url, params, None).await?;

        if response.status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let content_type = response.content_type();
        if content_type.contains("application/json") {
            return decode_json(&response.body).map(Some);
        }
        Err(ODataError::unsupported_content_type(content_type))
    }

    /// Executes a POST request with a JSON body.
    ///
    /// Returns `None` for a no-content success or a non-JSON response body;
    /// POSTing to an OData Action may legitimately return nothing.
    pub async fn execute_post<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
        params: Option<&[(&str, &str)]>,
    ) -> ODataResult<Option<Value>> {
        let payload = encode_json(body)?;

        tracing::debug!(%url, payload_bytes = payload.len(), "POST");
        if let Some(params) = params {
            tracing::debug!(?params, "Query");
        }

        let response = self
            .dispatch(HttpMethod::Post, url, params, Some(payload))
            .await?;

        if response.status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if response.content_type().contains("application/json") {
            return decode_json(&response.body).map(Some);
        }
        Ok(None)
    }

    /// Executes a PATCH request with a JSON body. The response body is never
    /// decoded.
    pub async fn execute_patch<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
    ) -> ODataResult<()> {
        let payload = encode_json(body)?;

        tracing::debug!(%url, payload_bytes = payload.len(), "PATCH");

        self.dispatch(HttpMethod::Patch, url, None, Some(payload))
            .await?;
        Ok(())
    }

    /// Executes a DELETE request. The response body is never decoded.
    pub async fn execute_delete(&self, url: Url) -> ODataResult<()> {
        tracing::debug!(%url, "DELETE");

        self.dispatch(HttpMethod::Delete, url, None, None).await?;
        Ok(())
    }

    /// Single dispatch routine shared by all four verbs.
    ///
    /// Returns the response only after error translation: a non-success
    /// status has already been converted into a [`ProtocolError`], and any
    /// transport failure into [`ODataError::Transport`].
    async fn dispatch(
        &self,
        method: HttpMethod,
        url: Url,
        params: Option<&[(&str, &str)]>,
        body: Option<Bytes>,
    ) -> ODataResult<HttpResponse> {
        let url = apply_params(url, params);
        let headers = self.assemble_headers(method);

        let mut request = HttpRequest::new(method, url).with_timeout(self.config.timeout);
        request.headers = headers;
        if let Some(body) = body {
            request = request.with_body(body);
        }

        let response = self
            .transport
            .send(request)
            .await
            .map_err(ODataError::Transport)?;

        self.translate_protocol_error(&response)?;

        Ok(response)
    }

    /// Builds the headers for one request: a fresh copy of the immutable
    /// base set, the per-verb content-type, and the credential decoration.
    fn assemble_headers(&self, method: HttpMethod) -> HashMap<String, String> {
        let mut headers = HashMap::from([
            ("Accept".to_string(), "application/json".to_string()),
            ("OData-Version".to_string(), ODATA_VERSION.to_string()),
            ("User-Agent".to_string(), self.config.user_agent.clone()),
        ]);

        if matches!(method, HttpMethod::Post | HttpMethod::Patch) {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }

        if let Some(credential) = &self.credential {
            credential.apply(&mut headers);
        }

        headers
    }

    /// Extracts a [`ProtocolError`] from a failure-status response.
    ///
    /// Fields absent or empty in the OData error payload keep their sentinel
    /// values, as does the whole error when the body is not JSON or carries
    /// no `error` object.
    fn translate_protocol_error(&self, response: &HttpResponse) -> Result<(), ProtocolError> {
        if response.status.is_success() {
            return Ok(());
        }

        let mut error = ProtocolError::from_status(response.status.as_u16());

        if response.content_type().contains("application/json") {
            if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(&response.body) {
                if let Some(detail) = envelope.error {
                    if let Some(code) = detail.code.filter(|s| !s.is_empty()) {
                        error.code = code;
                    }
                    if let Some(message) = detail.message.filter(|s| !s.is_empty()) {
                        error.message = message;
                    }
                    if let Some(inner) = detail
                        .innererror
                        .and_then(|ie| ie.message)
                        .filter(|s| !s.is_empty())
                    {
                        error.detailed_message = inner;
                    }
                }
            }
        }

        tracing::debug!(error = %error, "Protocol error");

        Err(error)
    }
}

/// OData v4 error response envelope.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
    innererror: Option<InnerError>,
}

#[derive(Debug, Deserialize)]
struct InnerError {
    message: Option<String>,
}

/// Appends flat query parameters to a fully-resolved URL.
fn apply_params(mut url: Url, params: Option<&[(&str, &str)]>) -> Url {
    if let Some(params) = params {
        url.query_pairs_mut().extend_pairs(params.iter().copied());
    }
    url
}

fn encode_json<T: Serialize + ?Sized>(body: &T) -> ODataResult<Bytes> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(|e| TransportError::Serialization(format!("Failed to encode body: {}", e)).into())
}

fn decode_json(body: &[u8]) -> ODataResult<Value> {
    serde_json::from_slice(body)
        .map_err(|e| TransportError::Serialization(format!("Failed to decode body: {}", e)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::BearerCredential;
    use crate::transport::ReqwestTransport;

    fn executor(credential: Option<Arc<dyn Credential>>) -> RequestExecutor {
        let config = ODataConfig::default();
        let transport = Arc::new(ReqwestTransport::new(&config).unwrap());
        RequestExecutor::new(config, transport, credential)
    }

    fn json_response(status: u16, body: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/json; charset=utf-8".to_string(),
        );
        HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_base_headers_per_verb() {
        let executor = executor(None);

        let get_headers = executor.assemble_headers(HttpMethod::Get);
        assert_eq!(get_headers.get("Accept").unwrap(), "application/json");
        assert_eq!(get_headers.get("OData-Version").unwrap(), "4.0");
        assert!(get_headers.get("User-Agent").unwrap().starts_with("odata-client/"));
        assert!(!get_headers.contains_key("Content-Type"));

        let post_headers = executor.assemble_headers(HttpMethod::Post);
        assert_eq!(post_headers.get("Content-Type").unwrap(), "application/json");

        let patch_headers = executor.assemble_headers(HttpMethod::Patch);
        assert_eq!(patch_headers.get("Content-Type").unwrap(), "application/json");

        let delete_headers = executor.assemble_headers(HttpMethod::Delete);
        assert!(!delete_headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_headers_are_recomputed_per_call() {
        let executor = executor(None);

        let first = executor.assemble_headers(HttpMethod::Post);
        let second = executor.assemble_headers(HttpMethod::Get);

        // A POST must not leak its content-type into a later GET.
        assert!(first.contains_key("Content-Type"));
        assert!(!second.contains_key("Content-Type"));
    }

    #[test]
    fn test_credential_decorates_every_verb() {
        let credential: Arc<dyn Credential> = Arc::new(BearerCredential::from_string("tok"));
        let executor = executor(Some(credential));

        for method in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ] {
            let headers = executor.assemble_headers(method);
            assert_eq!(headers.get("Authorization").unwrap(), "Bearer tok");
        }
    }

    #[test]
    fn test_success_status_passes_translation() {
        let executor = executor(None);
        let response = json_response(200, "{}");
        assert!(executor.translate_protocol_error(&response).is_ok());
    }

    #[test]
    fn test_well_formed_error_body() {
        let executor = executor(None);
        let response = json_response(
            500,
            r#"{"error":{"code":"E1","message":"bad","innererror":{"message":"detail"}}}"#,
        );

        let err = executor.translate_protocol_error(&response).unwrap_err();
        assert_eq!(err.status_line, "HTTP 500");
        assert_eq!(err.code, "E1");
        assert_eq!(err.message, "bad");
        assert_eq!(err.detailed_message, "detail");
        assert_eq!(err.to_string(), "HTTP 500 | E1 | bad | detail");
    }

    #[test]
    fn test_empty_error_fields_fall_back_to_sentinels() {
        let executor = executor(None);
        let response = json_response(400, r#"{"error":{"code":"","message":""}}"#);

        let err = executor.translate_protocol_error(&response).unwrap_err();
        assert_eq!(err.code, ProtocolError::NO_CODE);
        assert_eq!(err.message, ProtocolError::NO_MESSAGE);
        assert_eq!(err.detailed_message, ProtocolError::NO_DETAILED_MESSAGE);
    }

    #[test]
    fn test_non_json_error_body_keeps_sentinels() {
        let executor = executor(None);
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/html".to_string());
        let response = HttpResponse {
            status: StatusCode::BAD_GATEWAY,
            headers,
            body: Bytes::from_static(b"<html>Bad Gateway</html>"),
        };

        let err = executor.translate_protocol_error(&response).unwrap_err();
        assert_eq!(
            err.to_string(),
            "HTTP 502 | None | Server did not supply any error messages | None"
        );
    }

    #[test]
    fn test_error_body_without_error_object_keeps_sentinels() {
        let executor = executor(None);
        let response = json_response(503, r#"{"status":"down"}"#);

        let err = executor.translate_protocol_error(&response).unwrap_err();
        assert_eq!(err.code, ProtocolError::NO_CODE);
        assert_eq!(err.message, ProtocolError::NO_MESSAGE);
    }

    #[test]
    fn test_apply_params_appends_to_existing_query() {
        let url = Url::parse("https://example.com/odata/People?$top=5").unwrap();
        let url = apply_params(url, Some(&[("$filter", "Name eq 'x'")]));

        let query = url.query().unwrap();
        assert!(query.contains("top=5"));
        assert!(query.contains("filter"));
    }

    #[test]
    fn test_apply_params_none_leaves_url_untouched() {
        let url = Url::parse("https://example.com/odata/People").unwrap();
        let applied = apply_params(url.clone(), None);
        assert_eq!(applied, url);
    }

    #[test]
    fn test_encode_json_round_trip() {
        let body = serde_json::json!({"name": "x"});
        let bytes = encode_json(&body).unwrap();
        assert_eq!(decode_json(&bytes).unwrap(), body);
    }
}
