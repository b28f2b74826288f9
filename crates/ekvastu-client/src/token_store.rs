//! Access/refresh token storage
//!
//! Validity is presence-only: a non-empty access token counts as valid until
//! the store is cleared. There is no expiry check and no refresh exchange; a
//! 401 from the backend is the only expiry signal.

use crate::{ApiError, Result};
use ekvastu_core::TokenPair;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Holds the current token pair, optionally mirrored to a JSON file
pub struct TokenStore {
    tokens: RwLock<Option<TokenPair>>,
    scheme: String,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Create an empty store that lives only in memory
    pub fn in_memory(scheme: impl Into<String>) -> Self {
        Self {
            tokens: RwLock::new(None),
            scheme: scheme.into(),
            path: None,
        }
    }

    /// Create a store backed by `path` (supports ~ for home directory)
    ///
    /// A missing file yields an empty store; an unreadable or invalid file is an error.
    pub fn persistent(scheme: impl Into<String>, path: &Path) -> Result<Self> {
        let path = expand_tilde(path)?;
        let tokens = load_tokens(&path)?;
        Ok(Self {
            tokens: RwLock::new(tokens),
            scheme: scheme.into(),
            path: Some(path),
        })
    }

    /// `"<scheme> <access token>"` when a token is present
    pub fn get_authorization_header(&self) -> Option<String> {
        let tokens = self.tokens.read().unwrap_or_else(|p| p.into_inner());
        tokens
            .as_ref()
            .filter(|pair| !pair.access_token.is_empty())
            .map(|pair| format!("{} {}", self.scheme, pair.access_token))
    }

    pub fn has_valid_token(&self) -> bool {
        let tokens = self.tokens.read().unwrap_or_else(|p| p.into_inner());
        tokens
            .as_ref()
            .is_some_and(|pair| !pair.access_token.is_empty())
    }

    /// Replace the current pair
    pub fn store_tokens(&self, access_token: &str, refresh_token: &str) {
        let pair = TokenPair::new(access_token, refresh_token);
        debug!(
            "Storing token pair (access prefix: {})",
            token_prefix(&pair.access_token)
        );

        if let Some(path) = &self.path {
            if let Err(e) = save_tokens(path, &pair) {
                warn!("Failed to persist tokens to {}: {}", path.display(), e);
            }
        }

        let mut tokens = self.tokens.write().unwrap_or_else(|p| p.into_inner());
        *tokens = Some(pair);
    }

    pub fn clear(&self) {
        let mut tokens = self.tokens.write().unwrap_or_else(|p| p.into_inner());
        *tokens = None;

        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed token file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove token file {}: {}", path.display(), e),
            }
        }
    }

    pub fn snapshot(&self) -> Option<TokenPair> {
        self.tokens
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// First characters of a token, safe to log
pub(crate) fn token_prefix(token: &str) -> &str {
    match token.char_indices().nth(8) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}

fn load_tokens(path: &Path) -> Result<Option<TokenPair>> {
    if !path.exists() {
        debug!("Token file does not exist: {}", path.display());
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ApiError::Config(format!(
            "Failed to read token file {}: {}",
            path.display(),
            e
        ))
    })?;

    let pair: TokenPair = serde_json::from_str(&contents).map_err(|e| {
        ApiError::Config(format!(
            "Failed to parse token file {}: {}",
            path.display(),
            e
        ))
    })?;

    debug!("Loaded token pair from {}", path.display());
    Ok(Some(pair))
}

fn save_tokens(path: &Path, pair: &TokenPair) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_vec_pretty(pair).map_err(std::io::Error::other)?;
    fs::write(path, json)
}

/// Expand tilde (~) in path to home directory
fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| ApiError::Config("Invalid UTF-8 in path".to_string()))?;

    let home = || {
        dirs::home_dir()
            .ok_or_else(|| ApiError::Config("Could not determine home directory".to_string()))
    };

    if let Some(stripped) = path_str.strip_prefix("~/") {
        Ok(home()?.join(stripped))
    } else if path_str == "~" {
        home()
    } else {
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_and_clear() {
        let store = TokenStore::in_memory("Bearer");
        assert!(!store.has_valid_token());
        assert_eq!(store.get_authorization_header(), None);

        store.store_tokens("abc", "def");
        assert!(store.has_valid_token());
        assert_eq!(store.get_authorization_header().as_deref(), Some("Bearer abc"));

        store.clear();
        assert!(!store.has_valid_token());
        assert_eq!(store.get_authorization_header(), None);
    }

    #[test]
    fn test_empty_access_token_is_not_valid() {
        let store = TokenStore::in_memory("Bearer");
        store.store_tokens("", "refresh");
        assert!(!store.has_valid_token());
        assert_eq!(store.get_authorization_header(), None);
    }

    #[test]
    fn test_store_overwrites() {
        let store = TokenStore::in_memory("Token");
        store.store_tokens("first", "r1");
        store.store_tokens("second", "r2");
        let pair = store.snapshot().unwrap();
        assert_eq!(pair.access_token, "second");
        assert_eq!(pair.refresh_token, "r2");
        assert_eq!(store.get_authorization_header().as_deref(), Some("Token second"));
    }

    #[test]
    fn test_persistent_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("tokens.json");

        let store = TokenStore::persistent("Bearer", &path).unwrap();
        assert!(!store.has_valid_token());
        store.store_tokens("abc", "def");
        assert!(path.exists());

        let reloaded = TokenStore::persistent("Bearer", &path).unwrap();
        assert_eq!(reloaded.snapshot().unwrap().access_token, "abc");

        reloaded.clear();
        assert!(!path.exists());
        let empty = TokenStore::persistent("Bearer", &path).unwrap();
        assert!(!empty.has_valid_token());
    }

    #[test]
    fn test_persistent_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{ not json").unwrap();

        let result = TokenStore::persistent("Bearer", &path);
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_tilde(Path::new("~/t.json")).unwrap(), home.join("t.json"));
        assert_eq!(expand_tilde(Path::new("/tmp/t.json")).unwrap(), Path::new("/tmp/t.json"));
    }

    #[test]
    fn test_token_prefix() {
        assert_eq!(token_prefix("abcdefghijkl"), "abcdefgh");
        assert_eq!(token_prefix("abc"), "abc");
    }
}
