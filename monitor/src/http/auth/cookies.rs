//! Session cookie handling for token authentication.

use alloc::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use chrono::{DateTime, Utc};
use cookie::{SameSite, time::Duration as CookieDuration};
use rand::{Rng as _, distr::Alphanumeric};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

pub(crate) const COOKIE_TOKEN_SESSION: &str = "hostwatch_session";

/// Sessions are valid for a day after login.
pub(crate) const SESSION_TTL_SECS: i64 = 60 * 60 * 24;

const GENERATED_TOKEN_LEN: usize = 48;

/// Claims carried in the signed session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TokenSessionClaims {
    /// Issued at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
    /// Hex encoded sha256 of the token the session was issued for
    pub token_hash: String,
}

impl TokenSessionClaims {
    pub(crate) fn new(token: &str) -> Self {
        Self::issued_at(token, Utc::now())
    }

    pub(crate) fn issued_at(token: &str, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iat,
            exp: iat.saturating_add(SESSION_TTL_SECS),
            token_hash: hash_token(token),
        }
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Past half its lifetime a session is re-issued on use, so active clients stay logged in.
    pub(crate) fn needs_renewal_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.iat.saturating_add(SESSION_TTL_SECS / 2)
    }

    /// Fresh claims for the same token, valid for a full lifetime from `now`.
    pub(crate) fn renewed_at(&self, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iat,
            exp: iat.saturating_add(SESSION_TTL_SECS),
            token_hash: self.token_hash.clone(),
        }
    }

    /// Sessions issued for a previous token are invalid once the token changes.
    pub(crate) fn matches_token(&self, token: &SecretString) -> bool {
        self.token_hash == hash_token(token.expose_secret())
    }

    pub(crate) fn max_age(&self) -> CookieDuration {
        CookieDuration::seconds(self.exp.saturating_sub(self.iat))
    }
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Creates the session cookie. `Secure` is only set when the request arrived over HTTPS.
pub(crate) fn create_token_session_cookie(
    claims: &TokenSessionClaims,
    secure: bool,
) -> Option<Cookie<'static>> {
    let value = serde_json::to_string(claims).ok()?;
    Some(
        Cookie::build((COOKIE_TOKEN_SESSION, value))
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Strict)
            .max_age(claims.max_age())
            .path("/")
            .build(),
    )
}

pub(crate) fn get_token_session_from_cookie(jar: &SignedCookieJar) -> Option<TokenSessionClaims> {
    jar.get(COOKIE_TOKEN_SESSION)
        .and_then(|c| serde_json::from_str(c.value()).ok())
}

pub(crate) fn invalidate_session(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(COOKIE_TOKEN_SESSION).path("/"))
}

/// Generate a random alphanumeric token.
pub(crate) fn generate_token() -> Arc<SecretString> {
    let token: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(GENERATED_TOKEN_LEN)
        .map(char::from)
        .collect();
    Arc::new(SecretString::from(token))
}
