//! Authentication for the monitor: an optional static token exchanged for a session cookie.
//!
//! - Token mode: static token, generated if not provided. There is no bearer token; the token
//!   is only ever exchanged for a signed session cookie through `POST /login`.
//! - Disabled mode: every caller is authorized.

pub mod cookies;
pub mod limiter;
pub mod login;
pub mod middleware;

use alloc::sync::Arc;

use axum::{extract::FromRef, http::HeaderMap};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use base64::{Engine as _, engine::general_purpose::STANDARD as base64_gp_STANDARD};
use chrono::Utc;
use eyre::WrapErr as _;
use secrecy::{ExposeSecret as _, SecretString};
use tracing::info;

use crate::{
    app::AppState,
    config::{AuthConfig, AuthMode},
};

pub(crate) use cookies::TokenSessionClaims;
pub(crate) use limiter::LoginLimiter;
pub(crate) use login::routes;
pub(crate) use middleware::{request_is_secure, require};

pub(crate) struct Runtime {
    pub mode: Resolved,
    pub cookie_key: Key,
}

#[derive(Debug)]
pub(crate) enum Resolved {
    Disabled,
    Token { token: Arc<SecretString> },
}

/// What the authorization gate gets to see of a caller.
pub(crate) struct CallerContext<'a> {
    pub headers: &'a HeaderMap,
}

impl<'a> CallerContext<'a> {
    pub(crate) const fn new(headers: &'a HeaderMap) -> Self {
        Self { headers }
    }
}

/// Capability check guarding every operation that crosses the process boundary.
///
/// Evaluated fresh on each request, including the WebSocket upgrade.
pub(crate) trait Authorizer {
    fn is_authorized(&self, caller: &CallerContext<'_>) -> bool;
}

impl Authorizer for Runtime {
    fn is_authorized(&self, caller: &CallerContext<'_>) -> bool {
        match self.mode {
            Resolved::Disabled => true,
            Resolved::Token { .. } => self.session(caller).is_some(),
        }
    }
}

impl Runtime {
    /// The caller's unexpired session for the current token, if any.
    pub(crate) fn session(&self, caller: &CallerContext<'_>) -> Option<TokenSessionClaims> {
        let Resolved::Token { ref token } = self.mode else {
            return None;
        };
        let jar = SignedCookieJar::from_headers(caller.headers, self.cookie_key.clone());
        let claims = cookies::get_token_session_from_cookie(&jar)?;
        if claims.is_expired() {
            tracing::debug!("token session expired");
            return None;
        }
        claims.matches_token(token).then_some(claims)
    }

    /// A jar re-issuing the caller's session when it is past half its lifetime.
    pub(crate) fn renewed_session(&self, caller: &CallerContext<'_>) -> Option<SignedCookieJar> {
        let claims = self.session(caller)?;
        let now = Utc::now();
        if !claims.needs_renewal_at(now) {
            return None;
        }
        let cookie = cookies::create_token_session_cookie(
            &claims.renewed_at(now),
            request_is_secure(caller.headers),
        )?;
        tracing::debug!("renewing token session");
        Some(SignedCookieJar::from_headers(caller.headers, self.cookie_key.clone()).add(cookie))
    }
}

impl Runtime {
    /// Creates a new `Runtime` instance from the provided configuration.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The configured `cookie_secret` is not valid base64
    /// - The configured `cookie_secret` decodes to fewer than 64 bytes
    pub(crate) fn from_config(cfg: &AuthConfig) -> eyre::Result<Self> {
        let cookie_key = setup_cookie_key(cfg.cookie_secret.as_ref())?;
        let mode = resolve_auth_mode(&cfg.mode);

        Ok(Self { mode, cookie_key })
    }
}

/// Set up the cookie key from config, or generate one for this process.
#[tracing::instrument(skip_all)]
fn setup_cookie_key(cookie_secret: Option<&Arc<SecretString>>) -> eyre::Result<Key> {
    let Some(cookie_secret_val) = cookie_secret else {
        info!("No cookie_secret configured; sessions will not survive a restart");
        return Ok(Key::generate());
    };

    let bytes = base64_gp_STANDARD
        .decode((*cookie_secret_val).expose_secret().as_bytes())
        .wrap_err("Invalid cookie_secret in config")?;
    Key::try_from(bytes.as_slice())
        .wrap_err("Invalid cookie_secret length in config: expected at least 64 bytes")
}

/// Resolve the authentication mode from configuration.
fn resolve_auth_mode(mode: &AuthMode) -> Resolved {
    match *mode {
        AuthMode::None => {
            info!("Auth mode: none");
            Resolved::Disabled
        }
        AuthMode::Token { ref token } => {
            let token = if let Some(cfg_token) = token {
                info!("Auth mode: token (from config)");
                cfg_token.clone()
            } else {
                let generated = cookies::generate_token();
                info!("Auth mode: token (auto generated)");
                // We expose the generated token in logs once for operator use
                info!("Token: {}", generated.expose_secret());
                generated
            };
            Resolved::Token { token }
        }
    }
}

#[derive(Clone)]
pub(crate) struct LayerState {
    pub auth: Arc<Runtime>,
}

impl FromRef<AppState> for LayerState {
    fn from_ref(input: &AppState) -> Self {
        Self {
            auth: input.auth.clone(),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(input: &AppState) -> Self {
        input.auth.cookie_key.clone()
    }
}
