//! Job state storage.
//!
//! The store is injected behind a trait so that callers never depend on the
//! concrete backing: the in-memory implementation here is the whole story for
//! a single process, and a durable implementation can substitute later
//! without touching the job runner or the handlers.

pub mod memory;

use async_trait::async_trait;

use crate::models::alert::{Alert, AlertKind};
use crate::models::artifact::{Artifact, NewArtifact};
use crate::models::job::{Job, JobStatus, SourceType};

/// Input for creating a job record.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub filename: String,
    pub source: SourceType,
    pub source_url: Option<String>,
}

/// Partial update applied to a job record.
///
/// Only the populated fields change; the store applies the whole patch under
/// one lock acquisition so concurrent completions can never interleave a
/// half-written terminal state.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub hash: Option<String>,
    pub build_time_secs: Option<i64>,
    pub file_count: Option<i64>,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
}

/// Process-wide job, artifact, and alert storage.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job and return it with its allocated id.
    async fn create_job(&self, new: NewJob) -> Job;

    /// Fetch a single job.
    async fn job(&self, id: i64) -> Option<Job>;

    /// All jobs, newest first.
    async fn jobs(&self) -> Vec<Job>;

    /// Apply a partial update; returns the updated job, or `None` when absent.
    async fn update_job(&self, id: i64, patch: JobPatch) -> Option<Job>;

    /// Register a produced file.
    async fn add_artifact(&self, new: NewArtifact) -> Artifact;

    /// Fetch a single artifact record.
    async fn artifact(&self, id: i64) -> Option<Artifact>;

    /// All artifacts registered for a job, in registration order.
    async fn artifacts_for_job(&self, job_id: i64) -> Vec<Artifact>;

    /// Append an alert.
    async fn push_alert(&self, message: String, kind: AlertKind) -> Alert;

    /// All alerts, newest first.
    async fn alerts(&self) -> Vec<Alert>;
}
