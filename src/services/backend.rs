//! Backend REST client.
//!
//! DESIGN
//! ======
//! Every outbound call to the content API is expressed as a `BackendRequest`
//! and executed through the `Backend` trait. `HttpBackend` is the reqwest
//! implementation and owns the single `reqwest::Client`, so the configured
//! request/connect timeouts apply to every call. Tests swap in a scripted
//! mock (`state::test_helpers::MockBackend`).
//!
//! Replies are kept as `(status, json)` pairs; interpretation of the
//! `{statusCode, message, data}` envelope happens in the services that own
//! each endpoint.

use std::fmt;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::Method;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::BackendTimeouts;

// =============================================================================
// ERROR
// =============================================================================

/// Transport-level failures talking to the backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// Connection refused, DNS failure, reset, and similar.
    #[error("backend unreachable: {0}")]
    Network(String),

    /// The call exceeded the configured request or connect timeout.
    #[error("backend request timed out")]
    Timeout,

    /// The response body could not be read.
    #[error("backend response could not be read: {0}")]
    Decode(String),

    /// A multipart field carried a content type reqwest refused.
    #[error("invalid form field '{field}': {reason}")]
    InvalidForm { field: String, reason: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() || err.is_body() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// One part of a multipart submission, forwarded byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[cfg(test)]
impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), file_name: None, content_type: None, data: Bytes::from(value.into()) }
    }

    pub fn file(name: impl Into<String>, file_name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self { name: name.into(), file_name: Some(file_name.into()), content_type: Some(content_type.into()), data }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Vec<FormField>),
}

/// A call to the backend. `path` is relative to `SERVER_ADDRESS` and may
/// carry a query string.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl BackendRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), bearer: None, body: RequestBody::Empty }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    #[must_use]
    pub fn json(self, body: Value) -> Self {
        self.body(RequestBody::Json(body))
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

// Tokens stay out of logs even at trace level.
impl fmt::Display for BackendRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

// =============================================================================
// REPLY + ENVELOPE
// =============================================================================

/// Raw backend reply. `body` is `Value::Null` when the response was empty or
/// not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: u16,
    pub body: Value,
}

impl BackendReply {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Whether the transport status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The envelope's `statusCode` when it carries one, else the transport status.
    #[must_use]
    pub fn effective_status(&self) -> u16 {
        self.body
            .get("statusCode")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(self.status)
    }

    /// Human-readable backend message, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        let message: Message = serde_json::from_value(self.body.get("message")?.clone()).ok()?;
        let text = message.to_string();
        (!text.trim().is_empty()).then_some(text)
    }

    /// Parse the body as a typed envelope.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Decode` if the body does not match the envelope shape.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<Envelope<T>, BackendError> {
        serde_json::from_value(self.body.clone()).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

/// The `{statusCode, message, data}` shape every backend endpoint answers with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub status_code: Option<u16>,
    pub message: Option<Message>,
    pub data: Option<T>,
}

/// Validation failures arrive as a list of messages, everything else as one string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

// =============================================================================
// TRAIT + HTTP IMPLEMENTATION
// =============================================================================

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Send one request and return the reply, whatever its status.
    async fn execute(&self, request: BackendRequest) -> Result<BackendReply, BackendError>;
}

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client for `base_url` (already normalized with a trailing `/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the reqwest client cannot be built.
    pub fn new(base_url: String, timeouts: BackendTimeouts) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| BackendError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn execute(&self, request: BackendRequest) -> Result<BackendReply, BackendError> {
        let BackendRequest { method, path, bearer, body } = request;
        let mut builder = self.http.request(method, self.url(&path));
        if let Some(token) = bearer.as_deref() {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)?),
        };

        let response = builder.send().await.map_err(|e| {
            let err = BackendError::from(e);
            tracing::warn!(%path, error = %err, "backend call failed");
            err
        })?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        Ok(BackendReply::new(status, body))
    }
}

fn build_form(fields: Vec<FormField>) -> Result<Form, BackendError> {
    fields.into_iter().try_fold(Form::new(), |form, field| {
        let FormField { name, file_name, content_type, data } = field;
        let mut part = Part::bytes(data.to_vec());
        if let Some(file_name) = file_name {
            part = part.file_name(file_name);
        }
        if let Some(mime) = content_type.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|e| BackendError::InvalidForm { field: name.clone(), reason: e.to_string() })?;
        }
        Ok(form.part(name, part))
    })
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
