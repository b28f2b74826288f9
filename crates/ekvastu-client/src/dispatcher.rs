//! Request dispatch: header assembly, status classification and decoding

use crate::client::create_client;
use crate::config::ClientConfig;
use crate::endpoint::{ApiHost, RequestDescriptor};
use crate::token_store::TokenStore;
use crate::{ApiError, Result};
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Outcome of a status code, before any body is looked at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Unauthorized,
    Failure,
}

/// 2xx succeeds, 401 is unauthorized, every other code is a failure
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        401 => StatusClass::Unauthorized,
        _ => StatusClass::Failure,
    }
}

/// Turn a status and body into a typed result
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    match classify_status(status) {
        StatusClass::Success => serde_json::from_slice(body).map_err(ApiError::DecodingError),
        StatusClass::Unauthorized => Err(ApiError::Unauthorized),
        StatusClass::Failure => Err(ApiError::ServerError {
            status_code: status,
            message: String::from_utf8_lossy(body).into_owned(),
        }),
    }
}

/// Apply headers in order: static, then Authorization, then caller headers.
///
/// Caller headers take final precedence, including over Authorization.
pub fn build_headers(
    static_headers: &HeaderMap,
    authorization: Option<&str>,
    caller_headers: &[(String, String)],
) -> Result<HeaderMap> {
    let mut headers = static_headers.clone();

    if let Some(auth) = authorization {
        let value = HeaderValue::from_str(auth).map_err(|_| ApiError::InvalidRequest)?;
        headers.insert(AUTHORIZATION, value);
    }

    for (name, value) in caller_headers {
        let name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| ApiError::InvalidRequest)?;
        let value = HeaderValue::from_str(value).map_err(|_| ApiError::InvalidRequest)?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// Raw response before classification
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode_response(self.status, &self.body)
    }
}

/// Sends requests to the auth and domain hosts
pub struct Dispatcher {
    client: Client,
    auth_base_url: String,
    domain_base_url: String,
    static_headers: HeaderMap,
    tokens: Arc<TokenStore>,
    log_bodies: bool,
}

impl Dispatcher {
    pub fn new(config: &ClientConfig, tokens: Arc<TokenStore>) -> Result<Self> {
        let client = create_client(&config.http)?;
        Self::with_client(client, config, tokens)
    }

    /// Create a dispatcher that reuses an existing HTTP client
    pub fn with_client(client: Client, config: &ClientConfig, tokens: Arc<TokenStore>) -> Result<Self> {
        Ok(Self {
            client,
            auth_base_url: config.auth_base_url.clone(),
            domain_base_url: config.domain_base_url.clone(),
            static_headers: config.browser_headers.to_header_map()?,
            tokens,
            log_bodies: config.log_bodies,
        })
    }

    fn base_url(&self, host: ApiHost) -> &str {
        match host {
            ApiHost::Auth => &self.auth_base_url,
            ApiHost::Domain => &self.domain_base_url,
        }
    }

    /// Dispatch a catalogued endpoint and decode the response
    pub async fn send<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T> {
        self.send_raw(descriptor).await?.decode()
    }

    /// Dispatch a catalogued endpoint without classifying the status
    pub async fn send_raw(&self, descriptor: &RequestDescriptor) -> Result<RawResponse> {
        let url = descriptor
            .endpoint
            .url(self.base_url(descriptor.endpoint.host()))?;
        self.execute(
            descriptor.method.clone(),
            url,
            descriptor.body.clone(),
            &descriptor.headers,
        )
        .await
    }

    /// Dispatch to an arbitrary URL with the same headers and classification
    pub async fn send_url<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        headers: &[(String, String)],
    ) -> Result<T> {
        let url = Url::parse(url).map_err(|_| ApiError::InvalidURL)?;
        self.execute(method, url, body, headers).await?.decode()
    }

    #[instrument(skip_all, fields(method = %method, url = %url))]
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        caller_headers: &[(String, String)],
    ) -> Result<RawResponse> {
        let authorization = self.tokens.get_authorization_header();
        let headers = build_headers(
            &self.static_headers,
            authorization.as_deref(),
            caller_headers,
        )?;

        debug!(
            "{} {} (authorized: {})",
            method,
            url,
            authorization.is_some()
        );
        if self.log_bodies {
            if let Some(body) = &body {
                debug!("Request body: {}", String::from_utf8_lossy(body));
            }
        }

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!("Response status: {} ({} bytes)", status, body.len());
        if self.log_bodies {
            debug!("Response body: {}", String::from_utf8_lossy(&body));
        }

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_classification_is_total() {
        assert_eq!(classify_status(200), StatusClass::Success);
        assert_eq!(classify_status(204), StatusClass::Success);
        assert_eq!(classify_status(299), StatusClass::Success);
        assert_eq!(classify_status(401), StatusClass::Unauthorized);
        for code in [0, 100, 199, 300, 304, 400, 403, 404, 422, 500, 503, 599, 600, 999] {
            assert_eq!(classify_status(code), StatusClass::Failure, "code {}", code);
        }
    }

    #[test]
    fn test_decode_failure_on_success_is_decoding_error() {
        let result: Result<Value> = decode_response(200, b"<html>");
        assert!(matches!(result, Err(ApiError::DecodingError(_))));

        let result: Result<Value> = decode_response(204, b"");
        assert!(matches!(result, Err(ApiError::DecodingError(_))));
    }

    #[test]
    fn test_server_error_keeps_code_and_body() {
        let result: Result<Value> = decode_response(418, b"teapot");
        match result {
            Err(ApiError::ServerError {
                status_code,
                message,
            }) => {
                assert_eq!(status_code, 418);
                assert_eq!(message, "teapot");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_ignores_body() {
        let result: Result<Value> = decode_response(401, br#"{"ok":true}"#);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_header_precedence() {
        let mut static_headers = HeaderMap::new();
        static_headers.insert("accept", HeaderValue::from_static("application/json"));
        static_headers.insert("origin", HeaderValue::from_static("https://static"));

        let caller = vec![
            ("Origin".to_string(), "https://caller".to_string()),
            ("X-Extra".to_string(), "1".to_string()),
        ];
        let headers = build_headers(&static_headers, Some("Bearer abc"), &caller).unwrap();
        assert_eq!(headers["accept"], "application/json");
        assert_eq!(headers["origin"], "https://caller");
        assert_eq!(headers["authorization"], "Bearer abc");
        assert_eq!(headers["x-extra"], "1");

        let caller = vec![("Authorization".to_string(), "Basic xyz".to_string())];
        let headers = build_headers(&static_headers, Some("Bearer abc"), &caller).unwrap();
        assert_eq!(headers["authorization"], "Basic xyz");
    }

    #[test]
    fn test_invalid_caller_header() {
        let caller = vec![("bad header".to_string(), "v".to_string())];
        let result = build_headers(&HeaderMap::new(), None, &caller);
        assert!(matches!(result, Err(ApiError::InvalidRequest)));
    }
}
