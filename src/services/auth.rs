//! Sign-in and sign-out against the backend identity endpoints.

use std::fmt;

use serde::Deserialize;
use serde_json::{Value, json};

use super::backend::{Backend, BackendError, BackendRequest};

pub const LOGIN_FALLBACK_MESSAGE: &str = "Login failed. Please try again.";

const SIGN_IN_PATH: &str = "auth/signin";
const SIGN_OUT_PATH: &str = "auth/logout";

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("email and password are required")]
    BlankCredentials,
    /// Backend refused the credentials; carries its message verbatim.
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("sign-in response did not include an access token")]
    MissingAccessToken,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Login form input. Lives only for the duration of one request.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    fn is_blank(&self) -> bool {
        self.email.trim().is_empty() || self.password.is_empty()
    }
}

/// Successful sign-in: the token for the cookie and the backend body to echo.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub access_token: String,
    pub user: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInData {
    #[serde(default)]
    access_token: Option<String>,
}

/// Exchange credentials for an access token. One attempt, no retry.
pub async fn sign_in(backend: &dyn Backend, credentials: &Credentials) -> Result<SignedIn, LoginError> {
    if credentials.is_blank() {
        return Err(LoginError::BlankCredentials);
    }

    let request = BackendRequest::post(SIGN_IN_PATH).json(json!({
        "email": credentials.email,
        "password": credentials.password,
    }));
    let reply = backend.execute(request).await?;

    if !reply.is_success() {
        let message = reply
            .message()
            .unwrap_or_else(|| LOGIN_FALLBACK_MESSAGE.to_owned());
        return Err(LoginError::InvalidCredentials(message));
    }

    let access_token = reply
        .envelope::<SignInData>()
        .ok()
        .and_then(|envelope| envelope.data)
        .and_then(|data| data.access_token)
        .filter(|token| !token.is_empty())
        .ok_or(LoginError::MissingAccessToken)?;

    Ok(SignedIn { access_token, user: reply.body })
}

/// Ask the backend to invalidate `token`. Returns the backend's status.
pub async fn revoke(backend: &dyn Backend, token: &str) -> Result<u16, BackendError> {
    let reply = backend
        .execute(BackendRequest::post(SIGN_OUT_PATH).bearer(token))
        .await?;
    Ok(reply.effective_status())
}

/// Best-effort revocation. Never fails: local logout must not depend on the
/// backend being reachable.
pub async fn end_session(backend: &dyn Backend, token: Option<&str>) {
    let Some(token) = token else {
        return;
    };
    match revoke(backend, token).await {
        Ok(status) if (200..300).contains(&status) => tracing::debug!("backend token revoked"),
        Ok(status) => tracing::warn!(status, "backend refused token revocation"),
        Err(e) => tracing::warn!(error = %e, "token revocation failed"),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
