//! Bulk import submission endpoints

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::importer::{ImportPayload, ImportRequest, PayloadType};
use crate::AppState;

fn default_workers() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// JSON body of `POST /api/imports`
#[derive(Debug, Clone, Deserialize)]
pub struct ImportBody {
    #[serde(rename = "type")]
    pub payload_type: PayloadType,
    /// JSON lines, for `type = "json"`
    #[serde(default)]
    pub data: Option<String>,
    /// File link, for `type = "url"`
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_workers")]
    pub workers: u32,
    #[serde(default = "default_true")]
    pub update_if_exists: bool,
}

impl ImportBody {
    pub fn into_request(self) -> ApiResult<ImportRequest> {
        let payload = match self.payload_type {
            PayloadType::Json => ImportPayload::Json(self.data.unwrap_or_default()),
            PayloadType::Url => ImportPayload::Url(self.file_url.unwrap_or_default()),
            PayloadType::Upload => {
                return Err(ApiError::BadRequest(
                    "File uploads go to /api/imports/upload as multipart".to_string(),
                ))
            }
        };

        Ok(ImportRequest::new(payload)
            .with_queue(self.queue.unwrap_or_default())
            .with_parallel(self.parallel, self.workers)
            .with_update_if_exists(self.update_if_exists))
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub status: &'static str,
    pub endpoint: String,
    pub task: Value,
}

async fn submit(state: &AppState, request: ImportRequest) -> ApiResult<(StatusCode, Json<ImportResponse>)> {
    request.validate()?;
    let endpoint = request.endpoint();
    let queued = state.api.submit_import(&request).await?;

    tracing::info!(endpoint = %endpoint, "Bulk import queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(ImportResponse {
            status: "queued",
            endpoint,
            task: queued.task,
        }),
    ))
}

/// POST /api/imports
pub async fn create_import(
    State(state): State<AppState>,
    Json(body): Json<ImportBody>,
) -> ApiResult<(StatusCode, Json<ImportResponse>)> {
    let request = body.into_request()?;
    submit(&state, request).await
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "on" | "1" | "yes")
}

/// POST /api/imports/upload (multipart: file, queue, parallel, workers, update_if_exists)
pub async fn upload_import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ImportResponse>)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut queue = String::new();
    let mut parallel = false;
    let mut workers: u32 = 1;
    let mut update_if_exists = true;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload.json").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            file = Some((file_name, bytes.to_vec()));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid field {}: {}", name, e)))?;
        match name.as_str() {
            "queue" => queue = text,
            "parallel" => parallel = parse_flag(&text),
            "workers" => {
                workers = text
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid workers: {}", text)))?
            }
            "update_if_exists" => update_if_exists = parse_flag(&text),
            other => tracing::debug!(field = %other, "Ignoring unknown upload field"),
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;

    let request = ImportRequest::new(ImportPayload::Upload { file_name, bytes })
        .with_queue(queue)
        .with_parallel(parallel, workers)
        .with_update_if_exists(update_if_exists);

    submit(&state, request).await
}
