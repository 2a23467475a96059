//! Credential provider: OAuth tokens persisted on disk.
//!
//! The token file lives at `<config_dir>/gic/tokens.json` and is written
//! with owner-only permissions. [`TokenStore`] refreshes an expiring token
//! before handing it out.

pub mod oauth;

use crate::errors::AuthError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Seconds before expiry at which a token is treated as expired.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// Supplies a bearer token valid for the duration of one request.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn current_token(&self) -> Result<String, AuthError>;
}

/// OAuth token with its absolute expiry time (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: i64,
}

impl Token {
    /// Stamp `expires_at` from `expires_in` relative to now.
    pub fn stamp_expiry(mut self) -> Self {
        self.expires_at = chrono::Utc::now().timestamp() + self.expires_in;
        self
    }

    /// Valid while more than a minute remains.
    pub fn is_valid(&self) -> bool {
        chrono::Utc::now().timestamp() < self.expires_at - EXPIRY_BUFFER_SECS
    }
}

/// Default token location.
pub fn default_token_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gic").join("tokens.json"))
}

/// Read a token. A missing file is `Ok(None)`; corrupt JSON is an error.
pub fn load(path: &Path) -> Result<Option<Token>, AuthError> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(AuthError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(Some(serde_json::from_str(&data)?))
}

/// Write a token as pretty JSON, creating the parent directory if needed.
pub fn save(token: &Token, path: &Path) -> Result<(), AuthError> {
    let io_err = |source| AuthError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        std::fs::create_dir_all(dir).map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))
                .map_err(io_err)?;
        }
    }

    let data = serde_json::to_string_pretty(token)?;
    write_private(path, data.as_bytes()).map_err(io_err)
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)?;
    // An existing file keeps its old mode through `open`.
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, data)
}

/// Token file plus the endpoint used to refresh it.
pub struct TokenStore {
    path: PathBuf,
    token_url: String,
    http: reqwest::Client,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_token_url(path, oauth::TOKEN_URL)
    }

    pub fn with_token_url(path: impl Into<PathBuf>, token_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            token_url: token_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Token>, AuthError> {
        load(&self.path)
    }

    pub fn save(&self, token: &Token) -> Result<(), AuthError> {
        save(token, &self.path)
    }

    /// Remove the token file. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool, AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(AuthError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Return `token` if still valid, otherwise refresh and persist it.
    pub async fn ensure_valid(&self, token: Token) -> Result<Token, AuthError> {
        if token.is_valid() {
            return Ok(token);
        }

        tracing::info!("token expired, refreshing");
        let fresh = oauth::refresh(&self.http, &token, oauth::CLIENT_ID, &self.token_url).await?;
        self.save(&fresh)?;
        Ok(fresh)
    }
}

#[async_trait]
impl CredentialProvider for TokenStore {
    async fn current_token(&self) -> Result<String, AuthError> {
        let token = self.load()?.ok_or(AuthError::NotAuthenticated)?;
        let token = self.ensure_valid(token).await?;
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::tempdir;

    fn token(access: &str, expires_in_from_now: i64) -> Token {
        Token {
            access_token: access.to_string(),
            refresh_token: format!("{}-refresh", access),
            expires_in: 3600,
            expires_at: chrono::Utc::now().timestamp() + expires_in_from_now,
        }
    }

    async fn refresh_server(called: Arc<AtomicBool>) -> String {
        let app = Router::new().route(
            "/token",
            post(move |Json(body): Json<Value>| {
                let called = called.clone();
                async move {
                    called.store(true, Ordering::SeqCst);
                    assert_eq!(body["grant_type"], "refresh_token");
                    Json(json!({
                        "access_token": "refreshed-token",
                        "refresh_token": "refreshed-refresh-token",
                        "expires_in": 3600
                    }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/token", addr)
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let original = token("abc", 3600);
        save(&original, &path).unwrap();
        assert_eq!(load(&path).unwrap(), Some(original));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(load(&dir.path().join("nope.json")).unwrap(), None);
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "not valid json {{{").unwrap();
        assert!(matches!(load(&path), Err(AuthError::Json(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_uses_private_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("gic").join("tokens.json");
        save(&token("abc", 3600), &path).unwrap();

        let file_mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = std::fs::metadata(path.parent().unwrap())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn test_is_valid_uses_one_minute_buffer() {
        assert!(token("a", 120).is_valid());
        assert!(!token("a", 30).is_valid());
        assert!(!token("a", -1).is_valid());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        assert!(!store.clear().unwrap());
        store.save(&token("abc", 3600)).unwrap();
        assert!(store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_current_token_without_file_requires_login() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        let err = store.current_token().await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_valid_token_is_not_refreshed() {
        let called = Arc::new(AtomicBool::new(false));
        let url = refresh_server(called.clone()).await;
        let dir = tempdir().unwrap();
        let store = TokenStore::with_token_url(dir.path().join("tokens.json"), url);
        store.save(&token("valid-token", 3600)).unwrap();

        assert_eq!(store.current_token().await.unwrap(), "valid-token");
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_persisted() {
        let called = Arc::new(AtomicBool::new(false));
        let url = refresh_server(called.clone()).await;
        let dir = tempdir().unwrap();
        let store = TokenStore::with_token_url(dir.path().join("tokens.json"), url);
        store.save(&token("expired-token", -1)).unwrap();

        assert_eq!(store.current_token().await.unwrap(), "refreshed-token");
        assert!(called.load(Ordering::SeqCst));

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.access_token, "refreshed-token");
        assert_eq!(saved.refresh_token, "refreshed-refresh-token");
        assert!(saved.is_valid());
    }
}
