use super::*;
use axum::http::header::COOKIE;
use axum::http::{HeaderValue, Request};

fn headers_with_cookie(raw: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(raw).unwrap());
    headers
}

// =============================================================================
// from_headers
// =============================================================================

#[test]
fn from_headers_reads_auth_token() {
    let session = SessionContext::from_headers(&headers_with_cookie("theme=dark; auth-token=abc123"));
    assert_eq!(session.token(), Some("abc123"));
    assert!(session.is_authenticated());
}

#[test]
fn from_headers_without_cookie_is_anonymous() {
    let session = SessionContext::from_headers(&HeaderMap::new());
    assert_eq!(session, SessionContext::default());
    assert!(!session.is_authenticated());
}

#[test]
fn from_headers_empty_value_is_anonymous() {
    let session = SessionContext::from_headers(&headers_with_cookie("auth-token="));
    assert!(session.token().is_none());
}

#[test]
fn from_headers_ignores_other_cookie_names() {
    let session = SessionContext::from_headers(&headers_with_cookie("session_token=abc; auth_token=def"));
    assert!(!session.is_authenticated());
}

#[test]
fn with_token_empty_is_anonymous() {
    assert!(!SessionContext::with_token("").is_authenticated());
    assert_eq!(SessionContext::with_token("t").token(), Some("t"));
}

// =============================================================================
// extractor
// =============================================================================

#[tokio::test]
async fn extractor_prefers_context_from_extensions() {
    let req = Request::builder()
        .header(COOKIE, "auth-token=from-header")
        .body(())
        .unwrap();
    let (mut parts, ()) = req.into_parts();
    parts.extensions.insert(SessionContext::with_token("from-gate"));

    let session = SessionContext::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(session.token(), Some("from-gate"));
}

#[tokio::test]
async fn extractor_falls_back_to_headers() {
    let req = Request::builder()
        .header(COOKIE, "auth-token=from-header")
        .body(())
        .unwrap();
    let (mut parts, ()) = req.into_parts();

    let session = SessionContext::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(session.token(), Some("from-header"));
}

// =============================================================================
// cookies
// =============================================================================

#[test]
fn session_cookie_attributes() {
    let cookie = session_cookie("tok".into(), true);
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "tok");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert!(cookie.max_age().is_none());
}

#[test]
fn cleared_cookie_expires_immediately() {
    let cookie = cleared_session_cookie(false);
    assert_eq!(cookie.name(), COOKIE_NAME);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.max_age(), Some(Duration::ZERO));
}

#[test]
fn cleared_cookie_renders_max_age_zero() {
    let rendered = cleared_session_cookie(false).to_string();
    assert!(rendered.starts_with("auth-token=;"), "got {rendered}");
    assert!(rendered.contains("Max-Age=0"));
    assert!(rendered.contains("HttpOnly"));
    assert!(rendered.contains("Path=/"));
}
