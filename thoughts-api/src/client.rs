use std::sync::Arc;

use reqwest::{
    cookie::Jar,
    header::{HeaderValue, CONTENT_TYPE},
    Client, RequestBuilder, Url,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::ThoughtsUrl;

const SESSION_COOKIE: &str = "session_id";

/// Server-classified error types carried in the response envelope's `type`
/// field. Call sites match on these to show field-level feedback; anything
/// unrecognized falls through to [`ServerErrorKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerErrorKind {
    EntryExists,
    UsernameNotFound,
    InvalidPassword,
    PermissionDenied,
    ValidationError,
    Other(String),
}

impl From<&str> for ServerErrorKind {
    fn from(kind: &str) -> Self {
        match kind {
            "EntryExists" => ServerErrorKind::EntryExists,
            "UsernameNotFound" => ServerErrorKind::UsernameNotFound,
            "InvalidPassword" => ServerErrorKind::InvalidPassword,
            "PermissionDenied" => ServerErrorKind::PermissionDenied,
            "ValidationError" => ServerErrorKind::ValidationError,
            other => ServerErrorKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ServerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerErrorKind::EntryExists => write!(f, "EntryExists"),
            ServerErrorKind::UsernameNotFound => write!(f, "UsernameNotFound"),
            ServerErrorKind::InvalidPassword => write!(f, "InvalidPassword"),
            ServerErrorKind::PermissionDenied => write!(f, "PermissionDenied"),
            ServerErrorKind::ValidationError => write!(f, "ValidationError"),
            ServerErrorKind::Other(kind) => write!(f, "{}", kind),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server replied without a JSON content type on a JSON endpoint.
    /// Fatal to the current operation, never retried.
    #[error("unexpected content type from server (status {status})")]
    UnexpectedContentType { status: u16 },
    /// Non-2xx status with a well-formed error envelope.
    #[error("{kind}: {message}")]
    Server {
        kind: ServerErrorKind,
        message: String,
        status: u16,
    },
    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(String),
    /// A JSON body that did not match the expected envelope shape.
    #[error("payload error: {0}")]
    Payload(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The server-side classification, when there is one.
    pub fn server_kind(&self) -> Option<&ServerErrorKind> {
        match self {
            ApiError::Server { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

/// Every response from the thoughts server is wrapped in this envelope,
/// success and error alike. `type` is only present on errors.
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope<T> {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: String,
    pub date: Option<String>,
    pub data: Option<T>,
}

/// Classify a raw response into the expected `data` payload or an
/// [`ApiError`]. Pure so the taxonomy is testable without a server.
pub(crate) fn parse_payload<T: DeserializeOwned>(
    status: u16,
    is_json: bool,
    body: &[u8],
) -> Result<T, ApiError> {
    if !is_json {
        return Err(ApiError::UnexpectedContentType { status });
    }

    if !(200..300).contains(&status) {
        let envelope: ResponseEnvelope<serde_json::Value> = serde_json::from_slice(body)
            .map_err(|e| ApiError::Payload(format!("undecodable error body: {}", e)))?;
        return Err(ApiError::Server {
            kind: ServerErrorKind::from(envelope.kind.as_deref().unwrap_or("Unknown")),
            message: envelope.message,
            status,
        });
    }

    let envelope: ResponseEnvelope<T> = serde_json::from_slice(body)
        .map_err(|e| ApiError::Payload(format!("undecodable response body: {}", e)))?;
    envelope
        .data
        .ok_or_else(|| ApiError::Payload("response envelope is missing data".to_string()))
}

/// Like [`parse_payload`] but for operations whose success envelope carries
/// no `data` (logout, deletes).
pub(crate) fn parse_message(status: u16, is_json: bool, body: &[u8]) -> Result<(), ApiError> {
    match parse_payload::<serde_json::Value>(status, is_json, body) {
        Ok(_) => Ok(()),
        Err(ApiError::Payload(msg)) if msg.contains("missing data") => Ok(()),
        Err(e) => Err(e),
    }
}

/// Typed client for the thoughts server. Holds the session cookie in a jar
/// so authenticated calls need no per-request credential plumbing.
#[derive(Debug, Clone)]
pub struct ThoughtsClient {
    client: Client,
    base: Url,
}

impl ThoughtsClient {
    pub fn new(base_url: &str, session_id: Option<&str>) -> Result<Self, ApiError> {
        let base = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Config(format!("invalid base url {}: {}", base_url, e)))?;

        let jar = Arc::new(Jar::default());
        if let Some(session_id) = session_id {
            jar.add_cookie_str(
                &format!("{}={}; Path=/", SESSION_COOKIE, session_id),
                &base,
            );
        }

        let client = Client::builder()
            .cookie_provider(jar)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self { client, base })
    }

    pub(crate) fn url(&self) -> ThoughtsUrl {
        ThoughtsUrl::new(self.base.as_str())
    }

    async fn send(&self, request: RequestBuilder) -> Result<(u16, bool, Vec<u8>), ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok((status, is_json, body.to_vec()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: impl AsRef<str>,
    ) -> Result<T, ApiError> {
        tracing::debug!(url = url.as_ref(), "GET");
        let (status, is_json, body) = self.send(self.client.get(url.as_ref())).await?;
        parse_payload(status, is_json, &body)
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: impl AsRef<str>,
        payload: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!(url = url.as_ref(), "POST");
        let (status, is_json, body) = self
            .send(self.client.post(url.as_ref()).json(payload))
            .await?;
        parse_payload(status, is_json, &body)
    }

    pub(crate) async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: impl AsRef<str>,
        payload: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!(url = url.as_ref(), "PUT");
        let (status, is_json, body) = self
            .send(self.client.put(url.as_ref()).json(payload))
            .await?;
        parse_payload(status, is_json, &body)
    }

    pub(crate) async fn delete(&self, url: impl AsRef<str>) -> Result<(), ApiError> {
        tracing::debug!(url = url.as_ref(), "DELETE");
        let (status, is_json, body) = self.send(self.client.delete(url.as_ref())).await?;
        parse_message(status, is_json, &body)
    }

    pub(crate) async fn post_message<B: Serialize>(
        &self,
        url: impl AsRef<str>,
        payload: &B,
    ) -> Result<(), ApiError> {
        tracing::debug!(url = url.as_ref(), "POST");
        let (status, is_json, body) = self
            .send(self.client.post(url.as_ref()).json(payload))
            .await?;
        parse_message(status, is_json, &body)
    }
}
