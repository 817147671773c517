//! Alert model: append-only log of security and build events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Security,
    System,
    Blockchain,
    AiEnhancement,
    Build,
}

/// Alert entity
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub id: i64,
    pub message: String,
    pub kind: AlertKind,
    pub timestamp: DateTime<Utc>,
}
