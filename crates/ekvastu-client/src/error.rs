//! Error types for the API client

use thiserror::Error;

/// Errors produced by request dispatch and the flows built on it
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid URL")]
    InvalidURL,

    #[error("Invalid request data")]
    InvalidRequest,

    #[error("No data received")]
    NoData,

    #[error("Failed to decode response: {0}")]
    DecodingError(#[source] serde_json::Error),

    /// Any non-2xx, non-401 status; `message` is the raw response body
    #[error("Server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("Unauthorized access")]
    Unauthorized,

    /// Tenant resolution failed before an auth pipeline could dispatch
    #[error("Failed to get tenant configuration")]
    TenantUnavailable,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::NetworkError(err)
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::DecodingError(err)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors produced by the Cloudinary media client
#[derive(Debug, Error)]
pub enum CloudinaryError {
    #[error("Invalid image data")]
    InvalidImage,

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Failed to get image info: {0}")]
    LookupFailed(String),

    #[error("Image not found")]
    ImageNotFound,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from server")]
    InvalidResponse,

    #[error("Asset ID is required")]
    MissingAssetId,

    #[error("Public ID is required")]
    MissingPublicId,

    #[error("Cloudinary is not configured: {0}")]
    MissingConfiguration(String),

    /// Tenant resolution failed before an upload
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(ApiError::InvalidURL.to_string(), "Invalid URL");
        assert_eq!(ApiError::Unauthorized.to_string(), "Unauthorized access");
        assert_eq!(
            ApiError::TenantUnavailable.to_string(),
            "Failed to get tenant configuration"
        );
        assert_eq!(
            ApiError::ServerError {
                status_code: 500,
                message: "boom".to_string()
            }
            .to_string(),
            "Server error (500): boom"
        );
    }

    #[test]
    fn test_decode_error_keeps_source() {
        let err: ApiError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, ApiError::DecodingError(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("Failed to decode response"));
    }

    #[test]
    fn test_cloudinary_wraps_api_error() {
        let err: CloudinaryError = ApiError::TenantUnavailable.into();
        assert_eq!(err.to_string(), "Failed to get tenant configuration");
    }
}
