//! Terminology API client
//!
//! `TerminologyApi` is the seam between the HTTP handlers and the remote
//! REST API; `OclClient` is the `reqwest` implementation used in
//! production, tests substitute an in-memory fake.

use std::time::Duration;

use async_trait::async_trait;
use ocl_common::config::ServiceConfig;
use ocl_common::Concept;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::importer::{ImportPayload, ImportQueued, ImportRequest};
use crate::resources::SortParam;

const USER_AGENT: &str = concat!("ocl-web/", env!("CARGO_PKG_VERSION"));

/// Response header carrying the total result count of a search
pub const NUM_FOUND_HEADER: &str = "num_found";

/// Upstream client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid concept URI: {0}")]
    InvalidUri(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Import rejected: {0}")]
    Rejected(String),
}

/// Search parameters forwarded to the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: u64,
    pub limit: u64,
    pub sort: Option<SortParam>,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Total matches across all pages
    pub total: u64,
    pub items: Vec<Value>,
}

#[async_trait]
pub trait TerminologyApi: Send + Sync {
    /// Fetch one concept, with inverse mappings, by its relative URI
    async fn fetch_concept(&self, uri: &str) -> Result<Concept, ClientError>;

    /// GET any record, or an unpaged list, by its relative API path
    async fn fetch_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ClientError>;

    /// One page of a list endpoint, e.g. `/concepts/` for a global search
    /// or `/orgs/CIEL/sources/CIEL/v2/mappings/` for a repository version
    async fn list(&self, path: &str, query: &SearchQuery) -> Result<SearchPage, ClientError>;

    async fn submit_import(&self, request: &ImportRequest) -> Result<ImportQueued, ClientError>;
}

/// Accept only relative API paths such as `/orgs/CIEL/sources/CIEL/concepts/1/`
pub fn validate_uri(uri: &str) -> Result<(), ClientError> {
    let valid = uri.starts_with('/')
        && !uri.starts_with("//")
        && !uri.contains("://")
        && !uri.split('/').any(|segment| segment == "..")
        && !uri.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(ClientError::InvalidUri(uri.to_string()))
    }
}

/// `reqwest` client for the terminology REST API
pub struct OclClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl OclClient {
    pub fn new(config: &ServiceConfig) -> Result<Self, ClientError> {
        Self::with_timeout(&config.api_url, config.api_token.clone(), config.request_timeout)
    }

    pub fn with_timeout(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, format!("Token {}", token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        self.authorize(builder)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }
}

/// Map a non-success response to an error, keeping the upstream message
async fn error_for_status(response: reqwest::Response, what: &str) -> ClientError {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return ClientError::NotFound(what.to_string());
    }
    let error_text = response.text().await.unwrap_or_default();
    ClientError::Api(status.as_u16(), error_text)
}

/// Read the `exception` field of an upstream error body
fn exception_text(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("exception")? {
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl TerminologyApi for OclClient {
    async fn fetch_concept(&self, uri: &str) -> Result<Concept, ClientError> {
        validate_uri(uri)?;
        let url = format!("{}{}", self.base_url, uri);

        tracing::debug!(url = %url, "Fetching concept");

        let response = self
            .send(
                self.http_client
                    .get(&url)
                    .query(&[("includeInverseMappings", "true")]),
            )
            .await?;

        if !response.status().is_success() {
            return Err(error_for_status(response, uri).await);
        }

        let concept: Concept = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        tracing::debug!(uri = %uri, id = %concept.id, "Retrieved concept");

        Ok(concept)
    }

    async fn fetch_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ClientError> {
        validate_uri(path)?;
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(url = %url, ?params, "Fetching record");

        let response = self.send(self.http_client.get(&url).query(params)).await?;
        if !response.status().is_success() {
            return Err(error_for_status(response, path).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn list(&self, path: &str, query: &SearchQuery) -> Result<SearchPage, ClientError> {
        validate_uri(path)?;
        let url = format!("{}{}", self.base_url, path);

        let mut params: Vec<(&str, String)> = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
            ("verbose", "true".to_string()),
        ];
        if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }
        if let Some(sort) = &query.sort {
            let (key, field) = sort.query_pair();
            params.push((key, field.to_string()));
        }

        tracing::debug!(url = %url, ?params, "Listing");

        let response = self.send(self.http_client.get(&url).query(&params)).await?;
        if !response.status().is_success() {
            return Err(error_for_status(response, path).await);
        }

        let header_total = response
            .headers()
            .get(NUM_FOUND_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let items: Vec<Value> = response
            .json()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        Ok(SearchPage {
            total: header_total.unwrap_or(items.len() as u64),
            items,
        })
    }

    async fn submit_import(&self, request: &ImportRequest) -> Result<ImportQueued, ClientError> {
        request
            .validate()
            .map_err(|e| ClientError::Rejected(e.to_string()))?;

        let url = format!("{}{}", self.base_url, request.endpoint());
        let update = if request.update_if_exists { "true" } else { "false" };
        let builder = self
            .http_client
            .post(&url)
            .query(&[("update_if_exists", update)]);

        let builder = match &request.payload {
            ImportPayload::Json(body) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone()),
            ImportPayload::Upload { file_name, bytes } => {
                let part = Part::bytes(bytes.clone()).file_name(file_name.clone());
                builder.multipart(
                    Form::new()
                        .part("file", part)
                        .text("parallel", request.workers.to_string()),
                )
            }
            ImportPayload::Url(file_url) => builder.multipart(
                Form::new()
                    .text("file_url", file_url.clone())
                    .text("parallel", request.workers.to_string()),
            ),
        };

        tracing::info!(url = %url, parallel = request.parallel, workers = request.workers, "Submitting bulk import");

        let response = self.send(builder).await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::ACCEPTED {
            let task = serde_json::from_str(&body).unwrap_or(Value::Null);
            return Ok(ImportQueued { task });
        }

        let message = exception_text(&body).unwrap_or_else(|| format!("Import failed with status {}", status.as_u16()));
        tracing::warn!(status = status.as_u16(), error = %message, "Bulk import rejected");
        Err(ClientError::Rejected(message))
    }
}
