//! Client configuration: backend hosts, tenant, browser headers and media settings

use crate::client::HttpClientConfig;
use crate::{ApiError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_auth_base_url() -> String {
    "https://api.wajooba.xyz".to_string()
}

fn default_domain_base_url() -> String {
    "https://ekshakti-portal.onrender.com".to_string()
}

fn default_tenant_name() -> String {
    "marksampletest".to_string()
}

fn default_auth_scheme() -> String {
    "Bearer".to_string()
}

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Host serving sign-in, sign-up and the tenant ping
    #[serde(default = "default_auth_base_url")]
    pub auth_base_url: String,

    /// Host serving property, room, photo, profile and evaluation routes
    #[serde(default = "default_domain_base_url")]
    pub domain_base_url: String,

    /// Tenant resolved by the tenant ping
    #[serde(default = "default_tenant_name")]
    pub tenant_name: String,

    #[serde(default)]
    pub http: HttpClientConfig,

    #[serde(default)]
    pub browser_headers: BrowserHeaders,

    /// Scheme prefixed to the access token in the Authorization header
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,

    /// Where the token pair is persisted; `~` is expanded
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    #[serde(default)]
    pub cloudinary: CloudinaryConfig,

    /// Log request and response bodies at debug level
    #[serde(default)]
    pub log_bodies: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_base_url: default_auth_base_url(),
            domain_base_url: default_domain_base_url(),
            tenant_name: default_tenant_name(),
            http: HttpClientConfig::default(),
            browser_headers: BrowserHeaders::default(),
            auth_scheme: default_auth_scheme(),
            token_file: None,
            cloudinary: CloudinaryConfig::default(),
            log_bodies: false,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point both backend hosts and the media API at one base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.auth_base_url = base_url.clone();
        self.domain_base_url = base_url.clone();
        self.cloudinary.api_base = base_url;
        self
    }

    pub fn with_tenant_name(mut self, tenant_name: impl Into<String>) -> Self {
        self.tenant_name = tenant_name.into();
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = Some(path.into());
        self
    }
}

/// Browser-style headers attached to every backend request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserHeaders {
    pub content_type: String,
    pub accept: String,
    pub accept_language: String,
    pub origin: String,
    pub referer: String,
    pub sec_fetch_dest: String,
    pub sec_fetch_mode: String,
    pub sec_fetch_site: String,
    pub sec_gpc: String,
}

impl Default for BrowserHeaders {
    fn default() -> Self {
        Self {
            content_type: "application/json".to_string(),
            accept: "application/json, text/plain, */*".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            origin: "https://marksampletest.me.com:9001".to_string(),
            referer: "https://marksampletest.me.com:9001/".to_string(),
            sec_fetch_dest: "empty".to_string(),
            sec_fetch_mode: "cors".to_string(),
            sec_fetch_site: "cross-site".to_string(),
            sec_gpc: "1".to_string(),
        }
    }
}

impl BrowserHeaders {
    /// Build the static header map. Empty values are skipped.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let pairs = [
            ("content-type", &self.content_type),
            ("accept", &self.accept),
            ("accept-language", &self.accept_language),
            ("origin", &self.origin),
            ("referer", &self.referer),
            ("sec-fetch-dest", &self.sec_fetch_dest),
            ("sec-fetch-mode", &self.sec_fetch_mode),
            ("sec-fetch-site", &self.sec_fetch_site),
            ("sec-gpc", &self.sec_gpc),
        ];

        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            if value.is_empty() {
                continue;
            }
            let value = HeaderValue::from_str(value).map_err(|e| {
                ApiError::Config(format!("Invalid value for header {}: {}", name, e))
            })?;
            headers.insert(HeaderName::from_static(name), value);
        }
        Ok(headers)
    }
}

fn default_cloudinary_api_base() -> String {
    "https://api.cloudinary.com".to_string()
}

fn default_upload_preset() -> String {
    "qjdp0fft".to_string()
}

/// Cloudinary credentials and fallbacks used when the tenant context has no media settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    #[serde(default = "default_cloudinary_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default = "default_upload_preset")]
    pub upload_preset: String,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            api_base: default_cloudinary_api_base(),
            api_key: String::new(),
            api_secret: String::new(),
            cloud_name: String::new(),
            upload_preset: default_upload_preset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.auth_base_url, "https://api.wajooba.xyz");
        assert_eq!(config.domain_base_url, "https://ekshakti-portal.onrender.com");
        assert_eq!(config.tenant_name, "marksampletest");
        assert_eq!(config.auth_scheme, "Bearer");
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.cloudinary.upload_preset, "qjdp0fft");
        assert!(config.token_file.is_none());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_browser_header_map() {
        let headers = BrowserHeaders::default().to_header_map().unwrap();
        assert_eq!(headers.len(), 9);
        assert_eq!(headers["origin"], "https://marksampletest.me.com:9001");
        assert_eq!(headers["sec-gpc"], "1");
        assert_eq!(headers["content-type"], "application/json");
    }

    #[test]
    fn test_browser_header_map_skips_empty() {
        let headers = BrowserHeaders {
            origin: String::new(),
            referer: String::new(),
            ..Default::default()
        }
        .to_header_map()
        .unwrap();
        assert!(!headers.contains_key("origin"));
        assert!(!headers.contains_key("referer"));
        assert_eq!(headers.len(), 7);
    }

    #[test]
    fn test_invalid_header_value() {
        let result = BrowserHeaders {
            accept: "bad\nvalue".to_string(),
            ..Default::default()
        }
        .to_header_map();
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_with_base_url() {
        let config = ClientConfig::new().with_base_url("http://127.0.0.1:9000");
        assert_eq!(config.auth_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.domain_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.cloudinary.api_base, "http://127.0.0.1:9000");
    }
}
