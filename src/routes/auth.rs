//! Auth routes: login page, sign-in, and sign-out.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::error_response;
use crate::gate::LOGIN_PATH;
use crate::services::auth::{self as auth_svc, Credentials, LOGIN_FALLBACK_MESSAGE, LoginError};
use crate::services::session::{SessionContext, cleared_session_cookie, session_cookie};
use crate::state::AppState;

const LOGIN_PAGE: &str = include_str!("../../templates/login.html");

/// Map a sign-in failure to a status and the message shown to the user.
fn login_failure(err: &LoginError) -> (StatusCode, String) {
    match err {
        LoginError::BlankCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
        LoginError::InvalidCredentials(message) => (StatusCode::UNAUTHORIZED, message.clone()),
        LoginError::MissingAccessToken | LoginError::Backend(_) => {
            (StatusCode::BAD_GATEWAY, LOGIN_FALLBACK_MESSAGE.to_owned())
        }
    }
}

/// Clear the local session after a best-effort backend revocation, then send
/// the browser to the login page. Also used when the backend rejects the
/// token mid-session.
pub(crate) async fn end_session_response(state: &AppState, session: &SessionContext) -> Response {
    auth_svc::end_session(state.backend.as_ref(), session.token()).await;
    let jar = CookieJar::new().add(cleared_session_cookie(state.cookie_secure));
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /login`
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// `POST /api/auth/login` — exchange credentials for the `auth-token` cookie.
pub async fn login(State(state): State<AppState>, payload: Result<Json<Credentials>, JsonRejection>) -> Response {
    let credentials = match payload {
        Ok(Json(credentials)) => credentials,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "malformed login body");
            return error_response(StatusCode::BAD_REQUEST, LoginError::BlankCredentials.to_string());
        }
    };

    match auth_svc::sign_in(state.backend.as_ref(), &credentials).await {
        Ok(signed_in) => {
            tracing::info!("sign-in succeeded");
            let jar = CookieJar::new().add(session_cookie(signed_in.access_token, state.cookie_secure));
            (jar, Json(json!({ "user": signed_in.user }))).into_response()
        }
        Err(e) => {
            match &e {
                LoginError::BlankCredentials | LoginError::InvalidCredentials(_) => {
                    tracing::info!(error = %e, "sign-in rejected");
                }
                LoginError::MissingAccessToken | LoginError::Backend(_) => {
                    tracing::error!(error = %e, "sign-in failed");
                }
            }
            let (status, message) = login_failure(&e);
            error_response(status, message)
        }
    }
}

/// `POST /api/auth/logout` — always clears the cookie and redirects.
pub async fn logout(State(state): State<AppState>, session: SessionContext) -> Response {
    end_session_response(&state, &session).await
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
