//! Shared HTTP plumbing for the CMS backend.
//!
//! Every endpoint answers with the same envelope:
//!
//! ```json
//! { "success": true, "data": { ... }, "message": "...", "error": "...", "details": [ ... ] }
//! ```
//!
//! [`ApiClient`] unwraps it into typed results and turns non-2xx responses
//! into [`ApiError::Api`].

use std::time::Duration;

use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::clients::Session;
use crate::framework::StepError;
use crate::model::{FieldError, RunStep};

pub const NO_SESSION_MESSAGE: &str = "No authentication token found";

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Vec<FieldError>,
    },

    /// 2xx response whose body is not what the endpoint promises.
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("No authentication token found")]
    Unauthenticated,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A local file the backend would never accept, rejected before sending.
    #[error("invalid asset: {0}")]
    InvalidAsset(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Classifies the error for the submission step that produced it.
    ///
    /// Rejections carrying field details are validation errors at every
    /// step. Other rejections are upload errors during the upload and
    /// transport errors otherwise. A bad local asset is always an upload
    /// error.
    pub fn into_step_error(self, step: RunStep) -> StepError {
        match self {
            ApiError::Api { details, .. } if !details.is_empty() => StepError::validation(details),
            ApiError::Api { message, .. } if step == RunStep::Uploading => StepError::upload(message),
            ApiError::InvalidAsset(message) => StepError::upload(message),
            ApiError::Unauthenticated if step == RunStep::Uploading => {
                StepError::upload(NO_SESSION_MESSAGE)
            }
            other => StepError::transport(other.to_string()),
        }
    }
}

/// The backend's response wrapper.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
    #[serde(default)]
    pub details: Vec<FieldError>,
}

impl<T> Envelope<T> {
    /// `data`, or a malformed-response error naming `what`.
    pub fn into_data(self, what: &str) -> Result<T, ApiError> {
        self.data
            .ok_or_else(|| ApiError::Malformed(format!("{what}: response has no data")))
    }
}

/// HTTP client for one CMS backend.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
    session: Option<Session>,
}

impl ApiClient {
    /// `base_url` is the server root; the `/api` prefix is appended here.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuses an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            api_url: format!("{}/api", base_url.trim_end_matches('/')),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// URL of `path` followed by `segments`, each percent-encoded as a
    /// single path segment so ids and slugs cannot change the route.
    pub fn url_with_segments(&self, path: &str, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url =
            Url::parse(&self.url(path)).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    pub fn get_url(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn put_url(&self, url: Url) -> RequestBuilder {
        self.client.put(url)
    }

    pub fn delete_url(&self, url: Url) -> RequestBuilder {
        self.client.delete(url)
    }

    /// Attaches the bearer token, failing before anything is sent when the
    /// client has no session.
    pub fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let session = self.session.as_ref().ok_or(ApiError::Unauthenticated)?;
        Ok(request.bearer_auth(session.token()))
    }

    /// Sends `request` and decodes the envelope.
    ///
    /// `fallback` becomes the error message when a rejection carries neither
    /// `error` nor `message`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<Envelope<T>, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request failed");
            ApiError::Request(e)
        })?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Response");

        if !status.is_success() {
            let envelope = serde_json::from_str::<Envelope<serde_json::Value>>(&body).ok();
            let (message, details) = match envelope {
                Some(env) => (
                    env.error
                        .or(env.message)
                        .unwrap_or_else(|| fallback.to_string()),
                    env.details,
                ),
                None => (fallback.to_string(), Vec::new()),
            };
            warn!(status = status.as_u16(), %message, details = details.len(), "Rejected");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
                details,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Malformed(format!("{fallback}: {e}")))
    }

    /// [`send`](Self::send) and return `data`.
    pub async fn data<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        self.send(request, fallback).await?.into_data(fallback)
    }

    /// [`send`](Self::send) and discard the body.
    pub async fn check(&self, request: RequestBuilder, fallback: &str) -> Result<(), ApiError> {
        self.send::<serde_json::Value>(request, fallback).await?;
        Ok(())
    }
}
