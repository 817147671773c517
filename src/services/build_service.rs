//! Build job lifecycle.
//!
//! The service accepts a build request, records the job, and drives the rest
//! on a spawned task: stage the source into the job's own directory, resolve
//! the external tool, run it, then hash the result and emit provenance files.
//! Everything after acceptance lands on the job record; the caller already
//! has the id and polls for the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::alert::AlertKind;
use crate::models::artifact::{ArtifactKind, NewArtifact};
use crate::models::job::{BuildOptions, JobStatus, SourceType};
use crate::services::hasher;
use crate::services::provenance::ProvenanceWriter;
use crate::services::remote::{self, RemoteFetcher};
use crate::services::toolchain::Toolchain;
use crate::store::{JobPatch, JobStore, NewJob};

/// Failure modes of a running build. Rendered into `Job.error_message`;
/// never surfaced to the accepting request.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The tool binary is missing or unexecutable on this host.
    #[error("{tool} could not be started: {source}")]
    Spawn {
        tool: &'static str,
        source: std::io::Error,
    },

    /// The tool ran and reported failure.
    #[error("{tool} failed with exit code {code}")]
    ToolExit { tool: &'static str, code: i32 },

    /// The tool was killed before reporting an exit code.
    #[error("{tool} was terminated by a signal")]
    ToolKilled { tool: &'static str },

    /// Repository archive download failed.
    #[error("repository fetch failed: {0}")]
    Fetch(String),

    /// Archive extraction failed.
    #[error("archive extraction failed: {0}")]
    Extract(String),

    /// The fetched repository has no unambiguous buildable source.
    #[error("{0}")]
    UnsupportedSource(String),

    /// Filesystem failure while staging or collecting results.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Anything else (store inconsistencies, hashing failures).
    #[error("{0}")]
    Internal(String),
}

impl From<AppError> for BuildError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Io(io) => BuildError::Io(io),
            other => BuildError::Internal(other.to_string()),
        }
    }
}

/// Result data of a successful build, folded into the job record.
struct Completed {
    hash: String,
    artifact_count: i64,
}

/// Owns the build lifecycle: accepts requests, spawns one task per job,
/// records terminal state through the injected store.
#[derive(Clone)]
pub struct BuildService {
    store: Arc<dyn JobStore>,
    provenance: ProvenanceWriter,
    fetcher: RemoteFetcher,
    builds_root: PathBuf,
    // Bounds concurrent external tool invocations.
    permits: Arc<Semaphore>,
}

impl BuildService {
    pub fn new(store: Arc<dyn JobStore>, config: &Config) -> Self {
        Self {
            store,
            provenance: ProvenanceWriter::new(
                config.owner_name.clone(),
                config.owner_email.clone(),
            ),
            fetcher: RemoteFetcher::new(),
            builds_root: PathBuf::from(&config.builds_dir),
            permits: Arc::new(Semaphore::new(config.max_concurrent_builds.max(1))),
        }
    }

    /// Accept an uploaded source file for building.
    ///
    /// Validates only that the upload exists; any extension is accepted and
    /// unrecognized ones take the default toolchain. Returns the job id
    /// immediately, the build itself runs out-of-band.
    pub async fn start_file_build(
        &self,
        upload: &Path,
        original_name: &str,
        options: BuildOptions,
    ) -> Result<i64> {
        if !tokio::fs::try_exists(upload).await.unwrap_or(false) {
            return Err(AppError::Validation(format!(
                "Uploaded file not found: {}",
                upload.display()
            )));
        }

        let job = self
            .store
            .create_job(NewJob {
                filename: original_name.to_string(),
                source: SourceType::File,
                source_url: None,
            })
            .await;
        info!(job_id = job.id, filename = %job.filename, "Accepted file build");

        let service = self.clone();
        let upload = upload.to_path_buf();
        let original_name = original_name.to_string();
        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = service
                .file_build_steps(job.id, &upload, &original_name, &options)
                .await;
            service.finish(job.id, started, outcome).await;
        });

        Ok(job.id)
    }

    /// Accept a GitHub repository URL for building.
    ///
    /// The URL is validated synchronously; fetching, extraction, and the
    /// build itself run out-of-band like any other job.
    pub async fn start_remote_build(&self, url: &str) -> Result<i64> {
        remote::validate_repo_url(url)?;

        let job = self
            .store
            .create_job(NewJob {
                filename: remote::repo_name(url),
                source: SourceType::Remote,
                source_url: Some(url.to_string()),
            })
            .await;
        info!(job_id = job.id, url, "Accepted remote build");

        let service = self.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = service.remote_build_steps(job.id, &url).await;
            service.finish(job.id, started, outcome).await;
        });

        Ok(job.id)
    }

    /// The job's exclusive working directory, named by its id.
    fn build_dir(&self, job_id: i64) -> PathBuf {
        self.builds_root.join(format!("build_{job_id}"))
    }

    async fn file_build_steps(
        &self,
        job_id: i64,
        upload: &Path,
        original_name: &str,
        options: &BuildOptions,
    ) -> std::result::Result<Completed, BuildError> {
        let _permit = self.acquire_permit().await?;

        let build_dir = self.build_dir(job_id);
        tokio::fs::create_dir_all(&build_dir).await?;

        // Keep only the file name component; the upload staging name is ours
        // but the original name came over the wire.
        let file_name = Path::new(original_name)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string());
        let source = build_dir.join(file_name);
        tokio::fs::copy(upload, &source).await?;

        let toolchain = Toolchain::for_source(&source);
        self.note_progress(job_id, format!("Running {}", toolchain.tool_name()))
            .await;
        self.run_tool(toolchain, &build_dir, &source, options).await?;

        // Hash the staged source; remote builds hash the whole tree instead.
        self.collect_results(job_id, toolchain, &build_dir, &source, &source, options)
            .await
    }

    async fn remote_build_steps(
        &self,
        job_id: i64,
        url: &str,
    ) -> std::result::Result<Completed, BuildError> {
        let _permit = self.acquire_permit().await?;

        let build_dir = self.build_dir(job_id);
        tokio::fs::create_dir_all(&build_dir).await?;

        self.note_progress(job_id, "Fetching repository archive".to_string())
            .await;
        let archive = self.fetcher.fetch_archive(url, &build_dir).await?;
        let repo_dir = build_dir.join("repo");
        remote::extract_archive(&archive, &repo_dir).await?;

        let candidates = remote::find_candidate_sources(&repo_dir);
        let source = match candidates.len() {
            1 => candidates.into_iter().next().expect("length checked"),
            0 => {
                return Err(BuildError::UnsupportedSource(
                    "repository contains no buildable source files".to_string(),
                ))
            }
            n => {
                return Err(BuildError::UnsupportedSource(format!(
                    "repository contains {n} buildable source files; \
                     only single-source repositories are supported"
                )))
            }
        };

        let options = BuildOptions::default();
        let toolchain = Toolchain::for_source(&source);
        self.note_progress(job_id, format!("Running {}", toolchain.tool_name()))
            .await;
        self.run_tool(toolchain, &build_dir, &source, &options).await?;

        self.collect_results(job_id, toolchain, &build_dir, &repo_dir, &source, &options)
            .await
    }

    async fn acquire_permit(
        &self,
    ) -> std::result::Result<tokio::sync::OwnedSemaphorePermit, BuildError> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| BuildError::Internal("build queue closed".to_string()))
    }

    /// Spawn the external tool and wait for it to finish.
    async fn run_tool(
        &self,
        toolchain: Toolchain,
        build_dir: &Path,
        source: &Path,
        options: &BuildOptions,
    ) -> std::result::Result<(), BuildError> {
        let invocation = toolchain.resolve(build_dir, source, options);
        debug!(program = invocation.program, args = ?invocation.args, "Spawning build tool");

        let output = tokio::process::Command::new(invocation.program)
            .args(&invocation.args)
            .output()
            .await
            .map_err(|source| BuildError::Spawn {
                tool: toolchain.tool_name(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                tool = toolchain.tool_name(),
                status = %output.status,
                stderr = %stderr.trim(),
                "Build tool reported failure"
            );
            return Err(match output.status.code() {
                Some(code) => BuildError::ToolExit {
                    tool: toolchain.tool_name(),
                    code,
                },
                None => BuildError::ToolKilled {
                    tool: toolchain.tool_name(),
                },
            });
        }
        Ok(())
    }

    /// Hash the result, write provenance files, and register every artifact.
    async fn collect_results(
        &self,
        job_id: i64,
        toolchain: Toolchain,
        build_dir: &Path,
        hash_target: &Path,
        source: &Path,
        options: &BuildOptions,
    ) -> std::result::Result<Completed, BuildError> {
        let hash = hasher::digest(hash_target).await?;

        let job = self
            .store
            .job(job_id)
            .await
            .ok_or_else(|| BuildError::Internal(format!("job {job_id} vanished from store")))?;

        let mut artifact_count = 0i64;

        // The produced binary, if the tool left one where its naming
        // convention says it should.
        let binary = toolchain.expected_output(build_dir, source, options);
        match tokio::fs::metadata(&binary).await {
            Ok(meta) if meta.is_file() => {
                self.store
                    .add_artifact(NewArtifact {
                        job_id,
                        filename: binary
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_else(|| "output".to_string()),
                        filepath: binary.to_string_lossy().into_owned(),
                        filesize: meta.len() as i64,
                        kind: ArtifactKind::Executable,
                    })
                    .await;
                artifact_count += 1;
            }
            _ => {
                debug!(job_id, expected = %binary.display(), "No binary at the expected output path");
            }
        }

        for file in self.provenance.write(build_dir, &hash, &job).await? {
            self.store
                .add_artifact(NewArtifact {
                    job_id,
                    filename: file.filename.to_string(),
                    filepath: file.path.to_string_lossy().into_owned(),
                    filesize: file.size,
                    kind: file.kind,
                })
                .await;
            artifact_count += 1;
        }

        Ok(Completed {
            hash,
            artifact_count,
        })
    }

    /// Record the terminal state. All post-acceptance failures end here.
    async fn finish(
        &self,
        job_id: i64,
        started: Instant,
        outcome: std::result::Result<Completed, BuildError>,
    ) {
        let elapsed = started.elapsed().as_secs() as i64;
        match outcome {
            Ok(completed) => {
                self.store
                    .update_job(
                        job_id,
                        JobPatch {
                            status: Some(JobStatus::Success),
                            hash: Some(completed.hash),
                            build_time_secs: Some(elapsed),
                            file_count: Some(completed.artifact_count + 1),
                            status_message: Some("Build complete".to_string()),
                            ..Default::default()
                        },
                    )
                    .await;
                info!(job_id, elapsed_secs = elapsed, "Build succeeded");
            }
            Err(err) => {
                let message = err.to_string();
                self.store
                    .update_job(
                        job_id,
                        JobPatch {
                            status: Some(JobStatus::Failed),
                            error_message: Some(message.clone()),
                            build_time_secs: Some(elapsed),
                            ..Default::default()
                        },
                    )
                    .await;
                self.store
                    .push_alert(format!("Build {job_id} failed: {message}"), AlertKind::Build)
                    .await;
                warn!(job_id, elapsed_secs = elapsed, error = %message, "Build failed");
            }
        }
    }

    async fn note_progress(&self, job_id: i64, message: String) {
        self.store
            .update_job(
                job_id,
                JobPatch {
                    status_message: Some(message),
                    ..Default::default()
                },
            )
            .await;
    }
}
