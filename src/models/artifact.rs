//! Artifact model: a downloadable file produced by a job.

use serde::{Deserialize, Serialize};

/// Kind of produced file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Packaged binary produced by the external tool
    Executable,
    /// License notice
    License,
    /// Content hash record
    Hash,
    /// Security certificate or verification notice
    Certificate,
}

impl ArtifactKind {
    /// Content type used when serving the file for download.
    pub fn content_type(self) -> &'static str {
        match self {
            ArtifactKind::Executable => "application/octet-stream",
            ArtifactKind::License | ArtifactKind::Hash | ArtifactKind::Certificate => {
                "text/plain; charset=utf-8"
            }
        }
    }
}

/// Artifact entity, immutable once registered.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub id: i64,
    pub job_id: i64,
    pub filename: String,
    pub filepath: String,
    pub filesize: i64,
    pub kind: ArtifactKind,
}

/// Input for registering a produced file.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub job_id: i64,
    pub filename: String,
    pub filepath: String,
    pub filesize: i64,
    pub kind: ArtifactKind,
}
