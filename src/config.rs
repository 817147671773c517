//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Server bind address (host:port)
    pub bind_address: String,

    /// Directory where uploaded source files are staged before a build
    pub uploads_dir: String,

    /// Root directory for per-job build workspaces
    pub builds_dir: String,

    /// Owner identity stamped into provenance files
    pub owner_name: String,

    /// Contact address recorded alongside the owner identity (optional)
    pub owner_email: Option<String>,

    /// Static dashboard password checked by POST /api/auth
    pub dashboard_password: String,

    /// Maximum number of external tool invocations running at once
    pub max_concurrent_builds: usize,
}

redacted_debug!(Config {
    show bind_address,
    show uploads_dir,
    show builds_dir,
    show owner_name,
    show owner_email,
    redact dashboard_password,
    show max_concurrent_builds,
});

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".into()),
            builds_dir: env::var("BUILDS_DIR").unwrap_or_else(|_| "./builds".into()),
            owner_name: env::var("OWNER_NAME").unwrap_or_else(|_| "BuildForge".into()),
            owner_email: env::var("OWNER_EMAIL").ok(),
            dashboard_password: env::var("DASHBOARD_PASSWORD")
                .map_err(|_| AppError::Config("DASHBOARD_PASSWORD not set".into()))?,
            max_concurrent_builds: env::var("MAX_CONCURRENT_BUILDS")
                .unwrap_or_else(|_| "4".into())
                .parse()
                .unwrap_or(4),
        })
    }
}
