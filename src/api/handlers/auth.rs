//! Dashboard authentication handler.
//!
//! A single static password gates the dashboard; a wrong attempt is logged
//! as a security alert.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::alert::AlertKind;

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

pub async fn authenticate(
    State(state): State<SharedState>,
    Json(request): Json<AuthRequest>,
) -> Result<Json<AuthResponse>> {
    if request.password != state.config.dashboard_password {
        state
            .store
            .push_alert(
                "Unauthorized access attempt detected".to_string(),
                AlertKind::Security,
            )
            .await;
        return Err(AppError::Authentication("Invalid password".to_string()));
    }

    Ok(Json(AuthResponse {
        success: true,
        message: "Authentication successful".to_string(),
    }))
}
