//! Session route handlers: token login, logout and session check.

use core::net::SocketAddr;

use axum::{
    Form, Json, Router,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse as _, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::SignedCookieJar;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    app::AppState,
    http::auth::{
        Authorizer as _, CallerContext, Resolved,
        cookies::{self, TokenSessionClaims, create_token_session_cookie},
        request_is_secure,
    },
};

/// Longest token accepted by the login form.
const MAX_TOKEN_LEN: usize = 100;

/// Returns a router with all session-related routes.
pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_post))
        .route("/logout", post(logout))
        .route("/auth/check", get(check))
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    token: SecretString,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unix seconds at which the session was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_time: Option<i64>,
}

impl LoginResponse {
    fn failure(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            message: Some(message.to_owned()),
            login_time: None,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    /// Unix seconds at which the current session cookie was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_time: Option<i64>,
}

#[axum::debug_handler]
pub(crate) async fn login_post(
    State(AppState {
        auth,
        login_limiter,
        ..
    }): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    jar: SignedCookieJar,
    headers: HeaderMap,
    Form(LoginForm { token }): Form<LoginForm>,
) -> Response {
    let ip = peer.ip();
    if let Some(wait) = login_limiter.retry_after(ip).await {
        tracing::warn!(%ip, "login_post: too many failed attempts");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            LoginResponse::failure("Too many login attempts, try again later"),
        )
            .into_response();
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(wait.as_secs().max(1)));
        return response;
    }

    let supplied = token.expose_secret();
    if supplied.is_empty() || supplied.len() > MAX_TOKEN_LEN {
        return (
            StatusCode::BAD_REQUEST,
            LoginResponse::failure("Invalid input"),
        )
            .into_response();
    }

    match auth.mode {
        Resolved::Disabled => Json(LoginResponse {
            success: true,
            message: None,
            login_time: None,
        })
        .into_response(),
        Resolved::Token {
            token: ref expected,
        } if supplied == expected.expose_secret() => {
            login_limiter.reset(ip).await;
            let claims = TokenSessionClaims::new(expected.expose_secret());
            let Some(cookie) = create_token_session_cookie(&claims, request_is_secure(&headers))
            else {
                tracing::error!("login_post: failed to encode session claims");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            };
            tracing::info!(%ip, "login_post: session issued");
            (
                jar.add(cookie),
                Json(LoginResponse {
                    success: true,
                    message: None,
                    login_time: Some(claims.iat),
                }),
            )
                .into_response()
        }
        Resolved::Token { .. } => {
            login_limiter.record_failure(ip).await;
            tracing::info!(%ip, "login_post: wrong token");
            (
                StatusCode::UNAUTHORIZED,
                LoginResponse::failure("Invalid credentials"),
            )
                .into_response()
        }
    }
}

/// Handle logout requests.
#[axum::debug_handler]
pub(crate) async fn logout(_: State<AppState>, jar: SignedCookieJar) -> Response {
    let jar = cookies::invalidate_session(jar);
    (
        jar,
        Json(LoginResponse {
            success: true,
            message: None,
            login_time: None,
        }),
    )
        .into_response()
}

/// Reports whether the caller holds a valid session.
#[axum::debug_handler]
pub(crate) async fn check(
    State(AppState { auth, .. }): State<AppState>,
    headers: HeaderMap,
) -> Json<AuthCheckResponse> {
    let caller = CallerContext::new(&headers);
    Json(AuthCheckResponse {
        authenticated: auth.is_authorized(&caller),
        login_time: auth.session(&caller).map(|claims| claims.iat),
    })
}
