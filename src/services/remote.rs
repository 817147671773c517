//! Remote repository fetching.
//!
//! Downloads a GitHub repository archive, extracts it with the system `tar`,
//! and locates buildable source files for the job runner.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Url};
use walkdir::WalkDir;

use crate::error::{AppError, Result};
use crate::services::build_service::BuildError;
use crate::services::toolchain::Toolchain;

/// Name the downloaded archive is staged under inside the job directory.
pub const ARCHIVE_NAME: &str = "repo.tar.gz";

/// Validate that `url` references a GitHub repository (`owner/repo`).
///
/// Rejection happens at accept time; no job is created for an invalid URL.
pub fn validate_repo_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|_| AppError::Validation(format!("Invalid repository URL: {url}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!("Invalid repository URL: {url}")));
    }
    let host = parsed.host_str().unwrap_or("");
    if host != "github.com" && host != "www.github.com" {
        return Err(AppError::Validation(format!(
            "Only github.com repositories are supported, got: {url}"
        )));
    }
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    if segments.len() < 2 {
        return Err(AppError::Validation(format!(
            "Repository URL must name owner and repository: {url}"
        )));
    }
    Ok(())
}

/// Last path segment of the repository URL, used as the job's display name.
pub fn repo_name(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

/// Fetches repository archives over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
}

impl Default for RemoteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(concat!("buildforge-backend/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()
            .expect("reqwest client configuration is static");
        Self { client }
    }

    /// Download the default-branch archive into `dest` and return its path.
    pub async fn fetch_archive(
        &self,
        repo_url: &str,
        dest: &Path,
    ) -> std::result::Result<PathBuf, BuildError> {
        let archive_url = format!(
            "{}/archive/refs/heads/main.tar.gz",
            repo_url.trim_end_matches('/')
        );
        tracing::info!(url = %archive_url, "Fetching repository archive");

        let response = self
            .client
            .get(&archive_url)
            .send()
            .await
            .map_err(|e| BuildError::Fetch(format!("{archive_url}: {e}")))?;
        if !response.status().is_success() {
            return Err(BuildError::Fetch(format!(
                "{archive_url} returned HTTP {}",
                response.status()
            )));
        }
        let data = response
            .bytes()
            .await
            .map_err(|e| BuildError::Fetch(format!("{archive_url}: {e}")))?;

        let archive_path = dest.join(ARCHIVE_NAME);
        tokio::fs::write(&archive_path, &data).await?;
        Ok(archive_path)
    }
}

/// Extract a gzipped tarball into `dest` using the system `tar`.
pub async fn extract_archive(archive: &Path, dest: &Path) -> std::result::Result<(), BuildError> {
    tokio::fs::create_dir_all(dest).await?;
    let output = tokio::process::Command::new("tar")
        .args([
            "xzf",
            &archive.to_string_lossy(),
            "-C",
            &dest.to_string_lossy(),
        ])
        .output()
        .await
        .map_err(|e| BuildError::Extract(format!("tar could not be started: {e}")))?;

    if !output.status.success() {
        return Err(BuildError::Extract(format!(
            "tar exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

/// All buildable source files under `root`, sorted by path.
///
/// Only extensions with a direct toolchain mapping count; the unrecognized-
/// extension fallback does not apply when scanning a fetched tree.
pub fn find_candidate_sources(root: &Path) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|ext| Toolchain::supports_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();
    sources.sort();
    sources
}
