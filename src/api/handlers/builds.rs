//! Build management handlers.

use std::path::Path;

use axum::{
    extract::{Multipart, Path as UrlPath, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::artifact::Artifact;
use crate::models::job::{BuildOptions, Job};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBuildResponse {
    pub job_id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoteBuildRequest {
    pub url: String,
}

/// Accept a multipart source upload (`file` field, optional `options` JSON
/// field) and start a build.
pub async fn start_source_build(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<StartBuildResponse>> {
    let mut upload: Option<(String, bytes::Bytes)> = None;
    let mut options = BuildOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                upload = Some((filename, data));
            }
            "options" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read options: {e}")))?;
                options = serde_json::from_slice(&data)
                    .map_err(|e| AppError::Validation(format!("Invalid options JSON: {e}")))?;
            }
            _ => {}
        }
    }

    let (original_name, data) =
        upload.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    // Strip any path components a client smuggled into the filename.
    let original_name = Path::new(&original_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let uploads_dir = Path::new(&state.config.uploads_dir);
    tokio::fs::create_dir_all(uploads_dir).await?;
    let staged = uploads_dir.join(format!("{}-{original_name}", Uuid::new_v4()));
    tokio::fs::write(&staged, &data).await?;

    let job_id = state
        .builder
        .start_file_build(&staged, &original_name, options)
        .await?;

    Ok(Json(StartBuildResponse {
        job_id,
        message: "Build started successfully".to_string(),
    }))
}

/// Accept a GitHub repository URL and start a remote build.
pub async fn start_remote_build(
    State(state): State<SharedState>,
    Json(request): Json<RemoteBuildRequest>,
) -> Result<Json<StartBuildResponse>> {
    let job_id = state.builder.start_remote_build(&request.url).await?;
    Ok(Json(StartBuildResponse {
        job_id,
        message: "Repository processing started".to_string(),
    }))
}

/// List all jobs, newest first.
pub async fn list_jobs(State(state): State<SharedState>) -> Json<Vec<Job>> {
    Json(state.store.jobs().await)
}

/// Fetch a single job.
pub async fn get_job(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
) -> Result<Json<Job>> {
    let job = state
        .store
        .job(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

/// List the artifacts a job has produced.
pub async fn list_job_files(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
) -> Result<Json<Vec<Artifact>>> {
    if state.store.job(id).await.is_none() {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    Ok(Json(state.store.artifacts_for_job(id).await))
}
