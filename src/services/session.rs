//! Per-request session context and the `auth-token` cookie.
//!
//! ARCHITECTURE
//! ============
//! The browser's cookie jar is the only session store. `SessionContext` is
//! built once per request from the `Cookie` header (by the gate, which stashes
//! it in request extensions) and handed to handlers read-only. Nothing here
//! knows whether the backend still accepts the token.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

pub const COOKIE_NAME: &str = "auth-token";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<String>,
}

impl SessionContext {
    /// Read the session token from request headers. An empty cookie value
    /// counts as no session.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        CookieJar::from_headers(headers)
            .get(COOKIE_NAME)
            .map_or_else(Self::default, |cookie| Self::with_token(cookie.value()))
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self { token: (!token.is_empty()).then_some(token) }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Self>() {
            return Ok(session.clone());
        }
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Cookie carrying a freshly issued backend token.
#[must_use]
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Expired, empty cookie that removes the session from the browser.
#[must_use]
pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
