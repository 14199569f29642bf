use axum::{
    Extension, Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, validation};
use crate::auth::VerifyError;
use crate::services::{AccountInfo, AuthError};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub id: i32,
    pub username: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Session gate for mutating routes.
///
/// A missing credential and a tampered one collapse into the same
/// Unauthorized response; an expired one is reported distinctly so
/// clients can prompt for a fresh login. On success the verified claim
/// is attached to the request for downstream handlers, which never
/// re-parse the token.
pub async fn session_gate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers);

    let claim = match state.verifier().verify(token.as_deref()) {
        Ok(claim) => claim,
        Err(VerifyError::Expired) => return Err(ApiError::SessionExpired),
        Err(VerifyError::Missing | VerifyError::Invalid) => {
            return Err(ApiError::unauthorized());
        }
    };

    tracing::Span::current().record("user_id", claim.sub);
    request.extensions_mut().insert(claim);
    Ok(next.run(request).await)
}

/// Extract the session token from:
/// 1. The session cookie (from login)
/// 2. `Authorization: Bearer <token>` header
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie_header) = headers.get(header::COOKIE)
        && let Ok(cookies) = cookie_header.to_str()
    {
        for pair in cookies.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=')
                && name == SESSION_COOKIE
            {
                return Some(value.trim().to_string());
            }
        }
    }

    if let Some(auth_header) = headers.get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

/// Build the session cookie. Max-Age mirrors the token lifetime so the
/// cookie and the credential inside it expire together.
fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={max_age_seconds}; HttpOnly; SameSite=Strict"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a new account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AccountInfo>>, ApiError> {
    validation::validate_username(&payload.username)?;
    validation::validate_password(&payload.password)?;

    let account = state
        .auth_service()
        .register(&payload.username, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(account)))
}

/// POST /auth/login
/// Authenticate with username and password, sets the session cookie on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    // ConnectInfo travels as a request extension; extracting it through
    // Extension keeps it optional for connections that lack a peer address.
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    // Throttle by peer address when the connection provides one; without
    // it (reverse proxies aside, mainly in-process tests) fall back to
    // the submitted username.
    let source = connect_info.map_or_else(
        || format!("user:{}", payload.username),
        |Extension(ConnectInfo(addr))| addr.ip().to_string(),
    );

    if let Some(retry_after_seconds) = state.throttle().retry_after(&source) {
        return Err(ApiError::TooManyRequests {
            retry_after_seconds,
        });
    }

    let session = match state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await
    {
        Ok(session) => session,
        Err(err) => {
            if matches!(err, AuthError::InvalidCredentials) {
                state.throttle().record_failure(&source);
            }
            return Err(err.into());
        }
    };

    state.throttle().reset(&source);

    tracing::info!("Login: {}", session.username);

    let cookie = session_cookie(
        &session.token,
        session.expires_in_seconds,
        state.config().server.secure_cookies,
    );

    let body = Json(ApiResponse::success(LoginResponse {
        id: session.account_id,
        username: session.username,
    }));

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), body).into_response())
}

/// POST /auth/logout
/// Clear the session cookie
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = session_cookie("", 0, state.config().server.secure_cookies);

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(ApiResponse::success(true)),
    )
}

/// GET /auth/profile
/// Report who the caller is. An absent credential is not an error here;
/// the response simply says so. Invalid and expired credentials still
/// fail with their usual shapes.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let token = extract_token(&headers);

    let claim = match state.verifier().verify(token.as_deref()) {
        Ok(claim) => claim,
        Err(VerifyError::Missing) => {
            return Ok(Json(ApiResponse::success(ProfileResponse {
                authenticated: false,
                id: None,
                username: None,
            })));
        }
        Err(VerifyError::Expired) => return Err(ApiError::SessionExpired),
        Err(VerifyError::Invalid) => return Err(ApiError::unauthorized()),
    };

    Ok(Json(ApiResponse::success(ProfileResponse {
        authenticated: true,
        id: Some(claim.sub),
        username: Some(claim.username),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=en"),
        );
        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_token_absent() {
        let headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok", 14400, true);
        assert_eq!(
            cookie,
            "token=tok; Path=/; Max-Age=14400; HttpOnly; SameSite=Strict; Secure"
        );

        let cookie = session_cookie("tok", 14400, false);
        assert!(!cookie.contains("Secure"));
    }
}
