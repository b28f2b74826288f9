//! Response envelope used by the domain backend

use serde::{Deserialize, Serialize};

/// `{success, data?, error?, message?}` wrapper returned by domain endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Take the payload, if the backend sent one
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// Acknowledgement returned by delete endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
