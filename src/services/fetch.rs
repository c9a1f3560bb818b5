//! Authenticated backend access for dashboard pages.
//!
//! ARCHITECTURE
//! ============
//! Every dashboard read and write goes through `AuthedClient`: it attaches the
//! session's bearer token and classifies the reply before any caller sees the
//! data. A token the backend rejects always surfaces as
//! `FetchError::Unauthorized`, whether the 401 arrives as the transport status
//! or as the envelope's `statusCode`. Routes turn that into a forced logout,
//! so no page renders data obtained with a rejected token.

use std::sync::Arc;

use axum::http::Method;
use serde_json::Value;

use super::backend::{Backend, BackendError, BackendReply, BackendRequest, RequestBody};
use super::session::SessionContext;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("session token rejected by backend")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected backend payload: {0}")]
    Malformed(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// The one capability page loaders depend on.
#[async_trait::async_trait]
pub trait AuthenticatedFetch: Send + Sync {
    /// GET `path` with the session's bearer token and return the envelope's `data`.
    async fn get(&self, path: &str) -> Result<Value, FetchError>;
}

/// Outcome of an accepted write.
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub status: u16,
    pub message: Option<String>,
    pub data: Value,
}

pub struct AuthedClient {
    backend: Arc<dyn Backend>,
    token: Option<String>,
}

impl AuthedClient {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, session: &SessionContext) -> Self {
        Self { backend, token: session.token().map(str::to_owned) }
    }

    /// Send a create/update with the session token attached.
    pub async fn submit(&self, method: Method, path: &str, body: RequestBody) -> Result<Submitted, FetchError> {
        let reply = self
            .send(BackendRequest::new(method, path).body(body))
            .await?;
        let status = reply.effective_status();
        let envelope = reply.envelope::<Value>().unwrap_or_default();
        Ok(Submitted {
            status: envelope.status_code.unwrap_or(status),
            message: envelope.message.map(|m| m.to_string()),
            data: envelope.data.unwrap_or(Value::Null),
        })
    }

    async fn send(&self, request: BackendRequest) -> Result<BackendReply, FetchError> {
        // The gate only lets tokenless requests through to open routes; a
        // missing token here is treated like a rejected one.
        let token = self.token.as_deref().ok_or(FetchError::Unauthorized)?;
        let reply = self.backend.execute(request.bearer(token)).await?;
        classify(reply)
    }
}

#[async_trait::async_trait]
impl AuthenticatedFetch for AuthedClient {
    async fn get(&self, path: &str) -> Result<Value, FetchError> {
        let reply = self.send(BackendRequest::get(path)).await?;
        Ok(reply.body.get("data").cloned().unwrap_or(Value::Null))
    }
}

/// Map a reply onto the error taxonomy; replies below 400 pass through.
pub(crate) fn classify(reply: BackendReply) -> Result<BackendReply, FetchError> {
    let status = reply.effective_status();
    if reply.status == 401 || status == 401 {
        return Err(FetchError::Unauthorized);
    }
    match status {
        404 => Err(FetchError::NotFound(reply.message().unwrap_or_else(|| "resource not found".to_owned()))),
        s if s >= 400 => Err(FetchError::Rejected {
            status: s,
            message: reply
                .message()
                .unwrap_or_else(|| format!("backend returned status {s}")),
        }),
        _ => Ok(reply),
    }
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
