//! Bulk import requests
//!
//! Builds the upstream endpoint and validates an import before it is
//! posted by [`crate::client::TerminologyApi::submit_import`].

use ocl_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upstream endpoint for parallel imports of uploaded or linked files
pub const PARALLEL_IMPORT_PATH: &str = "/importers/bulk-import-parallel-inline/";

/// Upstream endpoint prefix for queued imports
pub const BULK_IMPORT_PATH: &str = "/importers/bulk-import/";

/// How the import content is supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadType {
    Json,
    Upload,
    Url,
}

/// Import content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportPayload {
    /// JSON lines sent as the request body
    Json(String),
    /// Uploaded file contents
    Upload { file_name: String, bytes: Vec<u8> },
    /// Link to a file the API fetches itself
    Url(String),
}

impl ImportPayload {
    pub fn payload_type(&self) -> PayloadType {
        match self {
            ImportPayload::Json(_) => PayloadType::Json,
            ImportPayload::Upload { .. } => PayloadType::Upload,
            ImportPayload::Url(_) => PayloadType::Url,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            ImportPayload::Json(body) => body.trim().is_empty(),
            ImportPayload::Upload { bytes, .. } => bytes.is_empty(),
            ImportPayload::Url(url) => url.trim().is_empty(),
        }
    }
}

/// One bulk import submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub payload: ImportPayload,
    pub queue: Option<String>,
    pub parallel: bool,
    pub workers: u32,
    pub update_if_exists: bool,
}

impl ImportRequest {
    /// Queued, non-parallel import with one worker that updates existing content
    pub fn new(payload: ImportPayload) -> Self {
        Self {
            payload,
            queue: None,
            parallel: false,
            workers: 1,
            update_if_exists: true,
        }
    }

    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        let queue = queue.into();
        self.queue = (!queue.trim().is_empty()).then(|| queue.trim().to_string());
        self
    }

    /// Parallel imports cannot be queued, so enabling it drops the queue
    pub fn with_parallel(mut self, parallel: bool, workers: u32) -> Self {
        self.parallel = parallel;
        self.workers = workers;
        if parallel {
            self.queue = None;
        }
        self
    }

    pub fn with_update_if_exists(mut self, update: bool) -> Self {
        self.update_if_exists = update;
        self
    }

    /// Payload for the selected type is present
    pub fn can_submit(&self) -> bool {
        !self.payload.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.can_submit() {
            return Err(Error::InvalidInput("Import payload is empty".to_string()));
        }
        if self.workers < 1 {
            return Err(Error::InvalidInput("workers must be at least 1".to_string()));
        }
        if let Some(queue) = &self.queue {
            let valid = queue
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !valid {
                return Err(Error::InvalidInput(format!("Invalid queue name: {}", queue)));
            }
        }
        Ok(())
    }

    /// Upstream path this import is posted to
    pub fn endpoint(&self) -> String {
        let payload_type = self.payload.payload_type();
        if self.parallel && payload_type != PayloadType::Json {
            return PARALLEL_IMPORT_PATH.to_string();
        }

        let mut path = BULK_IMPORT_PATH.to_string();
        if let Some(queue) = &self.queue {
            path.push_str(queue);
            path.push('/');
        }
        match payload_type {
            PayloadType::Upload => path.push_str("upload/"),
            PayloadType::Url => path.push_str("file-url/"),
            PayloadType::Json => {}
        }
        path
    }
}

/// Upstream accepted the import (202)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportQueued {
    /// Task details returned by the API, when any
    pub task: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> ImportPayload {
        ImportPayload::Upload {
            file_name: "ciel.json".to_string(),
            bytes: b"{}".to_vec(),
        }
    }

    #[test]
    fn test_json_endpoint() {
        let request = ImportRequest::new(ImportPayload::Json("{}".to_string()));
        assert_eq!(request.endpoint(), "/importers/bulk-import/");

        let queued = request.with_queue("my-queue");
        assert_eq!(queued.endpoint(), "/importers/bulk-import/my-queue/");
    }

    #[test]
    fn test_json_ignores_parallel_for_endpoint() {
        let request =
            ImportRequest::new(ImportPayload::Json("{}".to_string())).with_parallel(true, 4);
        assert_eq!(request.endpoint(), "/importers/bulk-import/");
    }

    #[test]
    fn test_file_endpoints() {
        let request = ImportRequest::new(upload()).with_queue("q1");
        assert_eq!(request.endpoint(), "/importers/bulk-import/q1/upload/");

        let request = ImportRequest::new(ImportPayload::Url("http://x/y.json".to_string()));
        assert_eq!(request.endpoint(), "/importers/bulk-import/file-url/");
    }

    #[test]
    fn test_parallel_clears_queue() {
        let request = ImportRequest::new(upload())
            .with_queue("q1")
            .with_parallel(true, 2);
        assert!(request.queue.is_none());
        assert_eq!(request.endpoint(), PARALLEL_IMPORT_PATH);
    }

    #[test]
    fn test_can_submit_requires_payload() {
        assert!(!ImportRequest::new(ImportPayload::Json("  ".to_string())).can_submit());
        assert!(!ImportRequest::new(ImportPayload::Url(String::new())).can_submit());
        assert!(ImportRequest::new(upload()).can_submit());
    }

    #[test]
    fn test_validate() {
        assert!(ImportRequest::new(upload()).validate().is_ok());
        assert!(ImportRequest::new(upload())
            .with_parallel(true, 0)
            .validate()
            .is_err());
        assert!(ImportRequest::new(upload())
            .with_queue("../admin")
            .validate()
            .is_err());
        assert!(ImportRequest::new(ImportPayload::Json(String::new()))
            .validate()
            .is_err());
    }
}
