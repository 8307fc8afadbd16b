//! HTTP client for the keyed document-collection store.
//!
//! Every failure maps onto the soft error taxonomy: transport and service
//! errors become `RemoteUnavailable`, client-side timeouts become `Timeout`,
//! and 404s become `RemoteNotFound`. The sync layer decides what to do with
//! them.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;

use vitalog_core::store::{FieldFilter, RemoteStore, SortSpec};
use vitalog_core::{Error, Result};

use crate::types::{AddDocumentResponse, ApiErrorResponse, QueryRequest, QueryResponse};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Client for the remote document store REST API.
#[derive(Debug, Clone)]
pub struct DocumentStoreClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl DocumentStoreClient {
    /// Create a client against `base_url` (e.g. "https://api.vitalog.app").
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::remote_unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach the bearer token sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Create headers for an API request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::remote_unavailable("invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    fn documents_url(&self, collection: &str) -> String {
        format!("{}/collections/{}/documents", self.base_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/collections/{}/documents/{}",
            self.base_url, collection, id
        )
    }

    fn query_url(&self, collection: &str) -> String {
        format!("{}/collections/{}/query", self.base_url, collection)
    }

    fn transport_error(err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::remote_unavailable(err.to_string())
        }
    }

    fn log_response(status: StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Map a non-success response onto the soft error taxonomy.
    fn status_error(status: StatusCode, body: &str, id: Option<&str>) -> Error {
        if status == StatusCode::NOT_FOUND {
            return Error::remote_not_found(id.unwrap_or("unknown"));
        }

        if let Ok(envelope) = serde_json::from_str::<ApiErrorResponse>(body) {
            return Error::remote_unavailable(format!(
                "{} ({}): {}",
                envelope.code,
                status.as_u16(),
                envelope.message
            ));
        }

        Error::remote_unavailable(format!("request failed ({})", status.as_u16()))
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        id: Option<&str>,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await.map_err(Self::transport_error)?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(Self::status_error(status, &body, id));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::remote_unavailable(format!("failed to parse response: {e}")))
    }

    /// Check a response for success without expecting a body.
    async fn expect_success(response: reqwest::Response, id: Option<&str>) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.map_err(Self::transport_error)?;
        Self::log_response(status, &body);
        Err(Self::status_error(status, &body, id))
    }
}

#[async_trait]
impl RemoteStore for DocumentStoreClient {
    async fn add(&self, collection: &str, document: Value) -> Result<String> {
        let response = self
            .client
            .post(self.documents_url(collection))
            .headers(self.headers()?)
            .json(&document)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let created: AddDocumentResponse = Self::parse_response(response, None).await?;
        Ok(created.id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let response = self
            .client
            .get(self.document_url(collection, id))
            .headers(self.headers()?)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document = Self::parse_response(response, Some(id)).await?;
        Ok(Some(document))
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
        order: Option<&SortSpec>,
    ) -> Result<Vec<Value>> {
        let body = QueryRequest {
            filters,
            order_by: order,
        };
        let response = self
            .client
            .post(self.query_url(collection))
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let result: QueryResponse = Self::parse_response(response, None).await?;
        Ok(result.documents)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
        let response = self
            .client
            .patch(self.document_url(collection, id))
            .headers(self.headers()?)
            .json(&patch)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::expect_success(response, Some(id)).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.document_url(collection, id))
            .headers(self.headers()?)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::expect_success(response, Some(id)).await
    }
}
