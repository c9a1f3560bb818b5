//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the login page, the same-origin session endpoints
//! and the dashboard data routes. `gate::enforce` wraps every route and the
//! fallback, so unmatched `/dashboard/...` paths are gated like real ones.

pub mod auth;
pub mod dashboard;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::gate;
use crate::state::AppState;

/// Upper bound for multipart entity forms (images included).
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/login", get(auth::login_page))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::overview))
        .route(
            "/dashboard/{section}",
            get(dashboard::list_entities)
                .post(dashboard::create_entity)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/dashboard/{section}/create", get(dashboard::create_page))
        .route(
            "/dashboard/{section}/categories",
            get(dashboard::list_categories).post(dashboard::create_category),
        )
        .route(
            "/dashboard/{section}/categories/{id}",
            get(dashboard::show_category).put(dashboard::update_category),
        )
        .route(
            "/dashboard/{section}/{id}",
            get(dashboard::edit_entity)
                .put(dashboard::update_entity)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .fallback(not_found)
        .layer(middleware::from_fn(gate::enforce))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `{"error": message}` with the given status.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "not found")
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub(crate) mod test_helpers {
    use axum::Router;
    use axum::body::Body;
    use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
    use axum::http::{HeaderMap, Request, StatusCode, request};
    use serde_json::Value;
    use tower::ServiceExt;

    /// Fully buffered response. Non-JSON bodies become a JSON string.
    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Value,
    }

    impl TestResponse {
        pub fn location(&self) -> Option<&str> {
            self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
        }

        pub fn set_cookie(&self) -> Option<&str> {
            self.headers.get(SET_COOKIE).and_then(|v| v.to_str().ok())
        }
    }

    pub fn builder(method: &str, uri: &str, cookie: Option<&str>) -> request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match cookie {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    pub fn empty(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
        builder(method, uri, cookie)
            .body(Body::empty())
            .expect("request should build")
    }

    pub fn json_body(method: &str, uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
        builder(method, uri, cookie)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build")
    }

    pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
        let response = app.oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, headers, body }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
