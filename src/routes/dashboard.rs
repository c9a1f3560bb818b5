//! Dashboard routes: content lists, edit views, and create/update forms.
//!
//! DESIGN
//! ======
//! Handlers build an `AuthedClient` from the request's session and hand it to
//! the content loaders. Any `FetchError::Unauthorized` ends the session
//! (revoke, clear cookie, redirect to `/login`) instead of rendering.
//! Entity forms are multipart and forwarded field by field; category forms
//! are JSON `{name}`.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::auth::end_session_response;
use super::error_response;
use crate::services::backend::{FormField, RequestBody};
use crate::services::content::{self, PageParams, Resource, Section};
use crate::services::fetch::{AuthedClient, FetchError};
use crate::services::session::SessionContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    #[serde(default)]
    name: String,
}

#[derive(Serialize)]
struct SectionLink {
    name: &'static str,
    href: String,
    create: String,
    categories: String,
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_section(segment: &str) -> Result<Section, Response> {
    Section::from_segment(segment)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("unknown section '{segment}'")))
}

fn fetch_error_status(err: &FetchError) -> StatusCode {
    match err {
        FetchError::NotFound(_) => StatusCode::NOT_FOUND,
        FetchError::Rejected { status, .. } if (400..500).contains(status) => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        FetchError::Unauthorized | FetchError::Rejected { .. } | FetchError::Malformed(_) | FetchError::Backend(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

async fn fetch_failure(state: &AppState, session: &SessionContext, err: FetchError) -> Response {
    let status = fetch_error_status(&err);
    match err {
        FetchError::Unauthorized => {
            tracing::info!("backend rejected session token; signing out");
            end_session_response(state, session).await
        }
        FetchError::NotFound(message) => error_response(status, message),
        FetchError::Rejected { status: upstream, message } => {
            tracing::warn!(upstream, %message, "backend rejected request");
            error_response(status, message)
        }
        FetchError::Malformed(detail) => {
            tracing::error!(%detail, "unexpected backend payload");
            error_response(status, "unexpected backend response")
        }
        FetchError::Backend(e) => {
            tracing::error!(error = %e, "backend call failed");
            error_response(status, "backend unavailable")
        }
    }
}

async fn render<T: Serialize>(state: &AppState, session: &SessionContext, result: Result<T, FetchError>) -> Response {
    match result {
        Ok(page) => Json(page).into_response(),
        Err(e) => fetch_failure(state, session, e).await,
    }
}

fn unsupported(resource: Resource) -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("{} cannot be modified from the dashboard", resource.collection_key()),
    )
}

fn multipart_error(err: MultipartError) -> Response {
    error_response(err.status(), err.body_text())
}

/// Collect every field in arrival order, repeated names included.
async fn read_multipart(mut multipart: Multipart) -> Result<Vec<FormField>, Response> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await.map_err(multipart_error)?;
        fields.push(FormField { name, file_name, content_type, data });
    }
    Ok(fields)
}

fn category_body(payload: Result<Json<CategoryInput>, JsonRejection>) -> Result<RequestBody, Response> {
    let name = match payload {
        Ok(Json(input)) => input.name,
        Err(rejection) => return Err(error_response(rejection.status(), rejection.body_text())),
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "category name is required"));
    }
    Ok(RequestBody::Json(json!({ "name": name })))
}

async fn submit(state: &AppState, session: &SessionContext, method: Method, path: &str, body: RequestBody) -> Response {
    let api = AuthedClient::new(state.backend.clone(), session);
    match api.submit(method, path, body).await {
        Ok(submitted) => {
            let status = StatusCode::from_u16(submitted.status)
                .ok()
                .filter(StatusCode::is_success)
                .unwrap_or(StatusCode::OK);
            let body = json!({ "message": submitted.message, "data": submitted.data });
            (status, Json(body)).into_response()
        }
        Err(e) => fetch_failure(state, session, e).await,
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /dashboard`
pub async fn overview() -> Json<Value> {
    let sections: Vec<SectionLink> = Section::ALL
        .iter()
        .map(|section| SectionLink {
            name: section.segment(),
            href: format!("/dashboard/{}", section.segment()),
            create: format!("/dashboard/{}/create", section.segment()),
            categories: format!("/dashboard/{}/categories", section.segment()),
        })
        .collect();
    Json(json!({ "sections": sections }))
}

/// `GET /dashboard/{section}`
pub async fn list_entities(
    State(state): State<AppState>,
    session: SessionContext,
    Path(section): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let section = match parse_section(&section) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let api = AuthedClient::new(state.backend.clone(), &session);
    let result = content::list(&api, Resource::Entity(section), &params).await;
    render(&state, &session, result).await
}

/// `GET /dashboard/{section}/{id}`
pub async fn edit_entity(
    State(state): State<AppState>,
    session: SessionContext,
    Path((section, id)): Path<(String, String)>,
) -> Response {
    let section = match parse_section(&section) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let api = AuthedClient::new(state.backend.clone(), &session);
    let result = content::edit_view(&api, section, &id).await;
    render(&state, &session, result).await
}

/// `GET /dashboard/{section}/create` — category options for the new-entity form.
pub async fn create_page(
    State(state): State<AppState>,
    session: SessionContext,
    Path(section): Path<String>,
) -> Response {
    let section = match parse_section(&section) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let api = AuthedClient::new(state.backend.clone(), &session);
    let result = content::create_view(&api, section).await;
    render(&state, &session, result).await
}

/// `POST /dashboard/{section}` — multipart create.
pub async fn create_entity(
    State(state): State<AppState>,
    session: SessionContext,
    Path(section): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let section = match parse_section(&section) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let resource = Resource::Entity(section);
    let Some((method, path)) = resource.create_route() else {
        return unsupported(resource);
    };
    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };
    match read_multipart(multipart).await {
        Ok(fields) => submit(&state, &session, method, &path, RequestBody::Multipart(fields)).await,
        Err(response) => response,
    }
}

/// `PUT /dashboard/{section}/{id}` — multipart update.
pub async fn update_entity(
    State(state): State<AppState>,
    session: SessionContext,
    Path((section, id)): Path<(String, String)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let section = match parse_section(&section) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let resource = Resource::Entity(section);
    let Some((method, path)) = resource.update_route(&id) else {
        return unsupported(resource);
    };
    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };
    match read_multipart(multipart).await {
        Ok(fields) => submit(&state, &session, method, &path, RequestBody::Multipart(fields)).await,
        Err(response) => response,
    }
}

/// `GET /dashboard/{section}/categories`
pub async fn list_categories(
    State(state): State<AppState>,
    session: SessionContext,
    Path(section): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let section = match parse_section(&section) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let api = AuthedClient::new(state.backend.clone(), &session);
    let result = content::list(&api, Resource::Category(section), &params).await;
    render(&state, &session, result).await
}

/// `GET /dashboard/{section}/categories/{id}`
pub async fn show_category(
    State(state): State<AppState>,
    session: SessionContext,
    Path((section, id)): Path<(String, String)>,
) -> Response {
    let section = match parse_section(&section) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let api = AuthedClient::new(state.backend.clone(), &session);
    let result = content::show(&api, Resource::Category(section), &id).await;
    render(&state, &session, result).await
}

/// `POST /dashboard/{section}/categories`
pub async fn create_category(
    State(state): State<AppState>,
    session: SessionContext,
    Path(section): Path<String>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> Response {
    let section = match parse_section(&section) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let resource = Resource::Category(section);
    let Some((method, path)) = resource.create_route() else {
        return unsupported(resource);
    };
    match category_body(payload) {
        Ok(body) => submit(&state, &session, method, &path, body).await,
        Err(response) => response,
    }
}

/// `PUT /dashboard/{section}/categories/{id}`
pub async fn update_category(
    State(state): State<AppState>,
    session: SessionContext,
    Path((section, id)): Path<(String, String)>,
    payload: Result<Json<CategoryInput>, JsonRejection>,
) -> Response {
    let section = match parse_section(&section) {
        Ok(s) => s,
        Err(response) => return response,
    };
    let resource = Resource::Category(section);
    let Some((method, path)) = resource.update_route(&id) else {
        return unsupported(resource);
    };
    match category_body(payload) {
        Ok(body) => submit(&state, &session, method, &path, body).await,
        Err(response) => response,
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
