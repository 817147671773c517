//! Artifact download handler.

use axum::extract::{Path as UrlPath, State};
use bytes::Bytes;

use crate::api::download::AttachmentResponse;
use crate::api::SharedState;
use crate::error::{AppError, Result};

/// Stream an artifact's bytes with its recorded filename.
pub async fn download(
    State(state): State<SharedState>,
    UrlPath(id): UrlPath<i64>,
) -> Result<AttachmentResponse> {
    let artifact = state
        .store
        .artifact(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("File {id} not found")))?;

    let data = tokio::fs::read(&artifact.filepath).await.map_err(|_| {
        AppError::NotFound(format!("File {} not found on disk", artifact.filename))
    })?;

    Ok(AttachmentResponse::new(
        Bytes::from(data),
        artifact.kind.content_type(),
        artifact.filename,
    ))
}
