use super::*;
use serde_json::json;

use crate::services::backend::FormField;
use crate::state::test_helpers::MockBackend;

fn client(backend: &Arc<MockBackend>, token: Option<&str>) -> AuthedClient {
    let session = token.map_or_else(SessionContext::default, SessionContext::with_token);
    AuthedClient::new(backend.clone(), &session)
}

// =============================================================================
// classify
// =============================================================================

#[test]
fn classify_envelope_401_is_unauthorized_despite_200_transport() {
    let reply = BackendReply::new(200, json!({"statusCode": 401, "message": "Unauthorized"}));
    assert!(matches!(classify(reply), Err(FetchError::Unauthorized)));
}

#[test]
fn classify_transport_401_is_unauthorized() {
    let reply = BackendReply::new(401, Value::Null);
    assert!(matches!(classify(reply), Err(FetchError::Unauthorized)));
}

#[test]
fn classify_404_is_not_found_with_message() {
    let reply = BackendReply::new(200, json!({"statusCode": 404, "message": "Article not found"}));
    match classify(reply) {
        Err(FetchError::NotFound(message)) => assert_eq!(message, "Article not found"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn classify_other_errors_are_rejected() {
    let reply = BackendReply::new(400, json!({"message": ["title should not be empty"]}));
    match classify(reply) {
        Err(FetchError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "title should not be empty");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[test]
fn classify_rejected_without_message_names_status() {
    let reply = BackendReply::new(503, Value::Null);
    let err = classify(reply).unwrap_err();
    assert_eq!(err.to_string(), "backend returned status 503");
}

#[test]
fn classify_success_passes_through() {
    let reply = BackendReply::new(200, json!({"statusCode": 200, "data": [1]}));
    assert_eq!(classify(reply.clone()).unwrap(), reply);
}

// =============================================================================
// AuthedClient::get
// =============================================================================

#[tokio::test]
async fn get_attaches_token_and_returns_data() {
    let backend = Arc::new(MockBackend::new().reply(
        Method::GET,
        "article/show-article-admin/hello",
        200,
        json!({"statusCode": 200, "data": {"slug": "hello"}}),
    ));

    let data = client(&backend, Some("abc123"))
        .get("article/show-article-admin/hello")
        .await
        .unwrap();
    assert_eq!(data, json!({"slug": "hello"}));
    assert_eq!(backend.requests()[0].bearer.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn get_missing_data_is_null() {
    let backend = Arc::new(MockBackend::new().reply(Method::GET, "x", 200, json!({"statusCode": 200})));
    let data = client(&backend, Some("t")).get("x").await.unwrap();
    assert_eq!(data, Value::Null);
}

#[tokio::test]
async fn get_without_token_never_calls_backend() {
    let backend = Arc::new(MockBackend::new());
    let err = client(&backend, None).get("x").await.unwrap_err();
    assert!(matches!(err, FetchError::Unauthorized));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn get_rejected_token_is_unauthorized() {
    let backend = Arc::new(MockBackend::new().reply(Method::GET, "x", 200, json!({"statusCode": 401})));
    let err = client(&backend, Some("stale")).get("x").await.unwrap_err();
    assert!(matches!(err, FetchError::Unauthorized));
}

#[tokio::test]
async fn get_network_failure_is_backend_error() {
    let backend = Arc::new(MockBackend::new().fail(Method::GET, "x", BackendError::Timeout));
    let err = client(&backend, Some("t")).get("x").await.unwrap_err();
    assert!(matches!(err, FetchError::Backend(BackendError::Timeout)));
}

// =============================================================================
// AuthedClient::submit
// =============================================================================

#[tokio::test]
async fn submit_returns_envelope_parts() {
    let backend = Arc::new(MockBackend::new().reply(
        Method::POST,
        "article/add-article-category",
        201,
        json!({"statusCode": 201, "message": "Category created", "data": {"id": 4}}),
    ));

    let submitted = client(&backend, Some("t"))
        .submit(Method::POST, "article/add-article-category", RequestBody::Json(json!({"name": "News"})))
        .await
        .unwrap();
    assert_eq!(
        submitted,
        Submitted { status: 201, message: Some("Category created".into()), data: json!({"id": 4}) }
    );

    let requests = backend.requests();
    let sent = &requests[0];
    assert_eq!(sent.bearer.as_deref(), Some("t"));
    assert_eq!(sent.body, RequestBody::Json(json!({"name": "News"})));
}

#[tokio::test]
async fn submit_forwards_multipart_untouched() {
    let fields = vec![FormField::text("title", "Hi"), FormField::text("published", "true")];
    let backend = Arc::new(MockBackend::new().reply(Method::PUT, "shop/edit-product/9", 200, json!({"statusCode": 200})));

    let submitted = client(&backend, Some("t"))
        .submit(Method::PUT, "shop/edit-product/9", RequestBody::Multipart(fields.clone()))
        .await
        .unwrap();
    assert_eq!(submitted.status, 200);
    assert_eq!(submitted.data, Value::Null);
    assert_eq!(backend.requests()[0].body, RequestBody::Multipart(fields));
}

#[tokio::test]
async fn submit_rejected_token_is_unauthorized() {
    let backend = Arc::new(MockBackend::new().reply(Method::POST, "shop/add-product", 401, Value::Null));
    let err = client(&backend, Some("stale"))
        .submit(Method::POST, "shop/add-product", RequestBody::Empty)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Unauthorized));
}
