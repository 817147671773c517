//! Job model: one request to turn a source input into a packaged artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the job's source input came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Uploaded source file
    File,
    /// Remote repository reference
    Remote,
}

/// Job lifecycle state.
///
/// Transitions only ever move forward: `Pending -> Building -> {Success, Failed}`.
/// `Pending` is the initial value before first persistence; jobs are stored
/// already in `Building`, so it is never observable through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Building,
    Success,
    Failed,
}

impl JobStatus {
    /// True once the job can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

/// Job entity
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: i64,
    pub filename: String,
    pub source: SourceType,
    pub source_url: Option<String>,
    pub status: JobStatus,
    pub hash: Option<String>,
    pub build_time_secs: Option<i64>,
    pub file_count: i64,
    pub created_at: DateTime<Utc>,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
}

/// User-supplied build options, all optional on the wire.
///
/// The comma-separated lists expand to one tool flag per entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
    pub one_file: bool,
    pub windowed: bool,
    pub custom_name: Option<String>,
    pub icon_path: Option<String>,
    pub hidden_imports: Option<String>,
    pub exclude_modules: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            one_file: true,
            windowed: false,
            custom_name: None,
            icon_path: None,
            hidden_imports: None,
            exclude_modules: None,
        }
    }
}

impl BuildOptions {
    /// Split a comma-separated option list into its non-empty entries.
    pub fn split_list(list: &Option<String>) -> Vec<String> {
        list.as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
