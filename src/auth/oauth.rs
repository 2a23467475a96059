//! OAuth authorization-code flow with PKCE.

use super::Token;
use crate::errors::AuthError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use sha2::{Digest, Sha256};

pub const CLIENT_ID: &str = "9d1c250a-e61b-44d9-88ed-5944d1962f5e";
pub const TOKEN_URL: &str = "https://console.anthropic.com/v1/oauth/token";
pub const SCOPE: &str = "org:create_api_key user:profile user:inference";
pub const REDIRECT_URI: &str = "https://console.anthropic.com/oauth/code/callback";

const CLAUDE_AUTHORIZE_URL: &str = "https://claude.ai/oauth/authorize";
const CONSOLE_AUTHORIZE_URL: &str = "https://console.anthropic.com/oauth/authorize";

/// PKCE verifier and its S256 challenge.
#[derive(Debug, Clone)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Result<Self, AuthError> {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes).map_err(|e| AuthError::Random(e.to_string()))?;
        let verifier = URL_SAFE_NO_PAD.encode(bytes);
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Ok(Self {
            verifier,
            challenge,
        })
    }
}

/// Build the authorization URL. Returns the URL and the PKCE verifier,
/// which doubles as the `state` parameter.
pub fn build_auth_url(use_console: bool) -> Result<(String, String), AuthError> {
    let pkce = Pkce::generate()?;
    let base = if use_console {
        CONSOLE_AUTHORIZE_URL
    } else {
        CLAUDE_AUTHORIZE_URL
    };

    let url = reqwest::Url::parse_with_params(
        base,
        &[
            ("code", "true"),
            ("client_id", CLIENT_ID),
            ("response_type", "code"),
            ("redirect_uri", REDIRECT_URI),
            ("scope", SCOPE),
            ("state", pkce.verifier.as_str()),
            ("code_challenge", pkce.challenge.as_str()),
            ("code_challenge_method", "S256"),
        ],
    )
    .map_err(|e| AuthError::Random(format!("invalid authorize URL: {}", e)))?;

    Ok((url.to_string(), pkce.verifier))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

/// Split a pasted `code#state` string.
pub fn split_auth_code(auth_code: &str) -> Result<(&str, &str), AuthError> {
    let parts: Vec<&str> = auth_code.trim().split('#').collect();
    match parts.as_slice() {
        [code, state] if !code.is_empty() && !state.is_empty() => Ok((code, state)),
        _ => Err(AuthError::InvalidCodeFormat),
    }
}

/// Exchange a pasted `code#state` for a token.
pub async fn exchange_code(
    http: &reqwest::Client,
    token_url: &str,
    auth_code: &str,
    verifier: &str,
) -> Result<Token, AuthError> {
    let (code, state) = split_auth_code(auth_code)?;

    let resp = http
        .post(token_url)
        .json(&serde_json::json!({
            "code": code,
            "state": state,
            "grant_type": "authorization_code",
            "client_id": CLIENT_ID,
            "redirect_uri": REDIRECT_URI,
            "code_verifier": verifier,
        }))
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::ExchangeFailed {
            status: status.as_u16(),
            body,
        });
    }

    let parsed: TokenResponse = resp.json().await?;
    Ok(Token {
        access_token: parsed.access_token,
        refresh_token: parsed.refresh_token.unwrap_or_default(),
        expires_in: parsed.expires_in,
        expires_at: 0,
    }
    .stamp_expiry())
}

/// Trade the refresh token for a new access token.
///
/// Keeps the old refresh token when the server does not rotate it.
pub async fn refresh(
    http: &reqwest::Client,
    token: &Token,
    client_id: &str,
    token_url: &str,
) -> Result<Token, AuthError> {
    let resp = http
        .post(token_url)
        .json(&serde_json::json!({
            "grant_type": "refresh_token",
            "client_id": client_id,
            "refresh_token": token.refresh_token,
        }))
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AuthError::RefreshFailed {
            status: status.as_u16(),
        });
    }

    let parsed: TokenResponse = resp.json().await?;
    Ok(Token {
        access_token: parsed.access_token,
        refresh_token: parsed
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| token.refresh_token.clone()),
        expires_in: parsed.expires_in,
        expires_at: 0,
    }
    .stamp_expiry())
}
