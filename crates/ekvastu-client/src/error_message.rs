//! Turns an `ApiError` into text fit for an error banner

use crate::ApiError;
use serde_json::Value;

/// Extract the message a user should see for `error`.
///
/// Server errors carry the raw body. The backend reports failures as
/// `{"errors": {"message": ...}}` and sometimes double-encodes that message
/// as another JSON document, so the string is parsed again for a nested
/// `message`. Fallbacks: nested message, then the outer message string, then
/// `Server error (<code>)`. Other errors use their display text.
pub fn extract_user_message(error: &ApiError) -> String {
    match error {
        ApiError::ServerError {
            status_code,
            message,
        } => errors_message(message)
            .map(|outer| nested_message(&outer).unwrap_or(outer))
            .unwrap_or_else(|| format!("Server error ({})", status_code)),
        other => other.to_string(),
    }
}

fn errors_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("errors")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn nested_message(message: &str) -> Option<String> {
    let json: Value = serde_json::from_str(message).ok()?;
    json.get("message")?.as_str().map(str::to_string)
}
