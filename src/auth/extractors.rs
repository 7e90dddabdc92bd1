//! Authentication extractors for axum handlers
//!
//! # Examples
//!
//! ```rust,no_run
//! use storefront::auth::Authenticated;
//! use storefront::models::User;
//!
//! async fn protected_handler(Authenticated(user): Authenticated) -> String {
//!     format!("Hello, {}!", user.display_name)
//! }
//! ```

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

use crate::error::AppError;
use crate::models::user::{User, UserRole};
use crate::state::AppState;

/// Extracts the authenticated user or rejects with 401
///
/// The session token is read from the `Authorization: Bearer` header first,
/// then from the `authToken` cookie.
pub struct Authenticated(pub User);

/// Extracts the authenticated user and requires the admin role
///
/// Rejects with 401 when unauthenticated and 403 when the account's role is
/// not `admin`, regardless of query content.
pub struct AdminOnly(pub User);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let app_state = AppState::from_ref(state);
        let claims = app_state.session_tokens().verify(&token)?;

        let user = User::find_by_id(app_state.pool(), claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(user) = Authenticated::from_request_parts(parts, state).await?;

        if user.role != UserRole::Admin {
            tracing::warn!(user_id = user.id, "non-admin attempted an admin route");
            return Err(AppError::Forbidden("Admin role required".to_string()));
        }

        Ok(Self(user))
    }
}

/// Pull the session token out of request headers
///
/// Bearer header wins over the `authToken` cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = value.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    cookie_value(headers, "authToken")
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_header_is_extracted() {
        let headers = headers_with(header::AUTHORIZATION, "Bearer abc.def.ghi");
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn auth_token_cookie_is_extracted() {
        let headers = headers_with(header::COOKIE, "theme=dark; authToken=tok123; lang=en");
        assert_eq!(session_token(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = headers_with(header::AUTHORIZATION, "Bearer from-header");
        headers.insert(header::COOKIE, HeaderValue::from_static("authToken=from-cookie"));
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn missing_and_malformed_tokens_yield_none() {
        assert!(session_token(&HeaderMap::new()).is_none());

        let basic = headers_with(header::AUTHORIZATION, "Basic dXNlcjpwYXNz");
        assert!(session_token(&basic).is_none());

        let empty = headers_with(header::COOKIE, "authToken=");
        assert!(session_token(&empty).is_none());
    }
}
