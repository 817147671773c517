//! API module - HTTP handlers and routing.

pub mod download;
pub mod handlers;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::services::build_service::BuildService;
use crate::store::JobStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn JobStore>,
    pub builder: BuildService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn JobStore>, builder: BuildService) -> Self {
        Self {
            config,
            store,
            builder,
        }
    }
}

pub type SharedState = Arc<AppState>;
