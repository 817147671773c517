//! In-memory job store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{JobPatch, JobStore, NewJob};
use crate::models::alert::{Alert, AlertKind};
use crate::models::artifact::{Artifact, NewArtifact};
use crate::models::job::{Job, JobStatus};

#[derive(Default)]
struct Inner {
    jobs: HashMap<i64, Job>,
    artifacts: HashMap<i64, Artifact>,
    alerts: Vec<Alert>,
    next_job_id: i64,
    next_artifact_id: i64,
    next_alert_id: i64,
}

/// In-memory `JobStore` implementation.
///
/// State lives for the process lifetime only; ids are sequential and strictly
/// increasing, which also names each job's build directory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_job(&self, new: NewJob) -> Job {
        let mut inner = self.inner.write().await;
        inner.next_job_id += 1;
        let job = Job {
            id: inner.next_job_id,
            filename: new.filename,
            source: new.source,
            source_url: new.source_url,
            status: JobStatus::Building,
            hash: None,
            build_time_secs: None,
            file_count: 0,
            created_at: Utc::now(),
            error_message: None,
            status_message: None,
        };
        inner.jobs.insert(job.id, job.clone());
        job
    }

    async fn job(&self, id: i64) -> Option<Job> {
        self.inner.read().await.jobs.get(&id).cloned()
    }

    async fn jobs(&self) -> Vec<Job> {
        let inner = self.inner.read().await;
        let mut jobs: Vec<Job> = inner.jobs.values().cloned().collect();
        // Newest first; ids break ties between same-instant creations.
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        jobs
    }

    async fn update_job(&self, id: i64, patch: JobPatch) -> Option<Job> {
        let mut inner = self.inner.write().await;
        let job = inner.jobs.get_mut(&id)?;
        if let Some(status) = patch.status {
            job.status = status;
        }
        if let Some(hash) = patch.hash {
            job.hash = Some(hash);
        }
        if let Some(secs) = patch.build_time_secs {
            job.build_time_secs = Some(secs);
        }
        if let Some(count) = patch.file_count {
            job.file_count = count;
        }
        if let Some(message) = patch.error_message {
            job.error_message = Some(message);
        }
        if let Some(message) = patch.status_message {
            job.status_message = Some(message);
        }
        Some(job.clone())
    }

    async fn add_artifact(&self, new: NewArtifact) -> Artifact {
        let mut inner = self.inner.write().await;
        inner.next_artifact_id += 1;
        let artifact = Artifact {
            id: inner.next_artifact_id,
            job_id: new.job_id,
            filename: new.filename,
            filepath: new.filepath,
            filesize: new.filesize,
            kind: new.kind,
        };
        inner.artifacts.insert(artifact.id, artifact.clone());
        artifact
    }

    async fn artifact(&self, id: i64) -> Option<Artifact> {
        self.inner.read().await.artifacts.get(&id).cloned()
    }

    async fn artifacts_for_job(&self, job_id: i64) -> Vec<Artifact> {
        let inner = self.inner.read().await;
        let mut artifacts: Vec<Artifact> = inner
            .artifacts
            .values()
            .filter(|artifact| artifact.job_id == job_id)
            .cloned()
            .collect();
        artifacts.sort_by_key(|artifact| artifact.id);
        artifacts
    }

    async fn push_alert(&self, message: String, kind: AlertKind) -> Alert {
        let mut inner = self.inner.write().await;
        inner.next_alert_id += 1;
        let alert = Alert {
            id: inner.next_alert_id,
            message,
            kind,
            timestamp: Utc::now(),
        };
        inner.alerts.push(alert.clone());
        alert
    }

    async fn alerts(&self) -> Vec<Alert> {
        let inner = self.inner.read().await;
        let mut alerts = inner.alerts.clone();
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        alerts
    }
}
