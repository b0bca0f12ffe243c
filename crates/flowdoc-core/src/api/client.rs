//! API client for communicating with the Flowdoc REST API.
//!
//! Every operation is a single request: no retry, no caching, and no
//! state carried between calls beyond the token and cancellation handle
//! the client was built with.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{multipart, Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::auth::SessionData;
use crate::config::Config;
use crate::models::{ListPage, UploadFile, UploadMetadata};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Multipart field carrying the file bytes
const FILE_FIELD: &str = "file";

/// Multipart field carrying the JSON-encoded metadata record
const METADATA_FIELD: &str = "metadata";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// API client for the Flowdoc backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    cancel: Option<CancellationToken>,
}

impl ApiClient {
    /// Create a new API client for the given backend root URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Backend URL cannot be used as a base: {}", base_url);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
            cancel: None,
        })
    }

    /// Create a client using the configured backend URL and timeout
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.request_timeout())
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..self.clone()
        }
    }

    /// Create a new ApiClient whose requests abort when `cancel` fires.
    pub fn with_cancellation(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel: Some(cancel),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // ===== Authentication =====

    /// Exchange credentials for a session token.
    ///
    /// The password is sent as-is and never logged.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<SessionData> {
        let url = self.endpoint(&["api", "auth", "login"]);
        debug!(%url, username, "Sending login request");

        let request = self.client.post(url).json(&LoginRequest { username, password });

        let result = self.send_json(request).await.and_then(|payload| {
            serde_json::from_value::<LoginResponse>(payload).map_err(|e| {
                ApiError::InvalidResponse(format!("login response has no token: {}", e))
            })
        });

        let auth = match result {
            Ok(auth) => auth,
            Err(e) => {
                warn!(error = %e, username, "Login failed");
                return Err(e).context("Login failed");
            }
        };

        Ok(SessionData {
            token: auth.token,
            username: username.to_string(),
            created_at: Utc::now(),
        })
    }

    // ===== Document Operations =====

    /// Upload one file with its metadata as a single multipart request.
    /// Returns the backend payload unmodified.
    pub async fn upload_document(&self, file: UploadFile, metadata: &UploadMetadata) -> Result<Value> {
        let url = self.endpoint(&["api", "documents", "upload"]);
        debug!(%url, file_name = %file.file_name, size = file.bytes.len(), "Uploading document");

        let result = async {
            let metadata_json = serde_json::to_string(metadata)
                .map_err(|e| ApiError::InvalidResponse(format!("unserializable metadata: {}", e)))?;
            let part = multipart::Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)?;
            let form = multipart::Form::new()
                .part(FILE_FIELD, part)
                .text(METADATA_FIELD, metadata_json);

            self.send_json(self.authorized(self.client.post(url)).multipart(form))
                .await
        }
        .await;

        Self::log_failure(result, "Document upload failed")
    }

    /// Fetch one page of the document list.
    pub async fn list_documents(&self, page: ListPage) -> Result<Value> {
        let url = self.endpoint(&["api", "documents"]);
        debug!(%url, page = page.page, limit = page.limit, "Fetching document list");

        let request = self
            .authorized(self.client.get(url))
            .query(&[("page", page.page), ("limit", page.limit)]);

        Self::log_failure(self.send_json(request).await, "Failed to fetch documents")
    }

    /// Fetch the detail record for a single document.
    pub async fn document_details(&self, document_id: &str) -> Result<Value> {
        let url = self.endpoint(&["api", "documents", document_id]);
        debug!(%url, document_id, "Fetching document details");

        let request = self.authorized(self.client.get(url));

        Self::log_failure(self.send_json(request).await, "Failed to fetch document details")
    }

    /// Submit a sharing configuration for a document. The configuration is
    /// forwarded without inspection.
    pub async fn share_document(&self, document_id: &str, share_config: &Value) -> Result<Value> {
        let url = self.endpoint(&["api", "documents", document_id, "share"]);
        debug!(%url, document_id, "Sharing document");

        let request = self.authorized(self.client.post(url)).json(share_config);

        Self::log_failure(self.send_json(request).await, "Failed to share document")
    }

    // ===== Request Plumbing =====

    /// Build an endpoint URL below the backend root. Segments are
    /// percent-encoded so document ids cannot escape their path slot.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request and decode the body as JSON. An empty body decodes
    /// to `Value::Null`.
    async fn send_json(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        self.cancellable(async move {
            let response = request.send().await?;
            let response = Self::check_response(response).await?;
            let text = response.text().await?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text)
                .map_err(|e| ApiError::InvalidResponse(format!("body is not JSON: {}", e)))
        })
        .await
    }

    /// Race a request against the client's cancellation token, if any.
    async fn cancellable<T>(
        &self,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        match self.cancel {
            Some(ref cancel) => tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ApiError::Cancelled),
                result = request => result,
            },
            None => request.await,
        }
    }

    fn log_failure(result: Result<Value, ApiError>, message: &'static str) -> Result<Value> {
        result.map_err(|e| {
            warn!(error = %e, "{}", message);
            anyhow::Error::new(e).context(message)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).expect("client should build")
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://localhost:5000");
        assert_eq!(
            api.endpoint(&["api", "documents", "42"]).as_str(),
            "http://localhost:5000/api/documents/42"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let api = client("https://example.com/flowdoc/");
        assert_eq!(
            api.endpoint(&["api", "documents", "7", "share"]).as_str(),
            "https://example.com/flowdoc/api/documents/7/share"
        );
    }

    #[test]
    fn test_endpoint_encodes_document_id() {
        let api = client("http://localhost:5000");
        assert_eq!(
            api.endpoint(&["api", "documents", "a/b"]).as_str(),
            "http://localhost:5000/api/documents/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(ApiClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(ApiClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_with_token_does_not_touch_original() {
        let api = client("http://localhost:5000");
        let authed = api.with_token("abc");
        assert!(!api.has_token());
        assert!(authed.has_token());
    }
}
