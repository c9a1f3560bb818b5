//! Access-control gate.
//!
//! DESIGN
//! ======
//! Runs in front of every route, before any handler or backend call. The
//! decision is stateless and only looks at whether an `auth-token` cookie is
//! present. Token validity is not checked here; a stale token reaches the
//! dashboard and is caught when the backend rejects it (`services::fetch`).

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::services::session::SessionContext;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Authentication requirement of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// `/dashboard` and everything below it.
    RequiresSession,
    /// Exactly `/login`.
    ForbidsSession,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    RedirectToLogin,
    RedirectToDashboard,
    PassThrough,
}

#[must_use]
pub fn classify_path(path: &str) -> RouteAccess {
    if path == DASHBOARD_PATH || path.starts_with("/dashboard/") {
        RouteAccess::RequiresSession
    } else if path == LOGIN_PATH {
        RouteAccess::ForbidsSession
    } else {
        RouteAccess::Open
    }
}

/// Exactly one action per request.
#[must_use]
pub fn decide(path: &str, authenticated: bool) -> GateDecision {
    match (classify_path(path), authenticated) {
        (RouteAccess::RequiresSession, false) => GateDecision::RedirectToLogin,
        (RouteAccess::ForbidsSession, true) => GateDecision::RedirectToDashboard,
        _ => GateDecision::PassThrough,
    }
}

/// Middleware entry point. On pass-through the parsed `SessionContext` is
/// stored in request extensions for handlers to reuse.
pub async fn enforce(mut req: Request, next: Next) -> Response {
    let session = SessionContext::from_headers(req.headers());
    let decision = decide(req.uri().path(), session.is_authenticated());
    tracing::debug!(path = %req.uri().path(), ?decision, "gate decision");

    match decision {
        // The original query string is not carried over to /login.
        GateDecision::RedirectToLogin => Redirect::temporary(LOGIN_PATH).into_response(),
        GateDecision::RedirectToDashboard => Redirect::temporary(DASHBOARD_PATH).into_response(),
        GateDecision::PassThrough => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
