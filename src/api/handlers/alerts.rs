//! Alert listing handler.

use axum::{extract::State, Json};

use crate::api::SharedState;
use crate::models::alert::Alert;

/// List all alerts, newest first.
pub async fn list_alerts(State(state): State<SharedState>) -> Json<Vec<Alert>> {
    Json(state.store.alerts().await)
}
