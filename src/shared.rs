use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::gamification::config::GamificationConfig;
use crate::gamification::repository::ParticipantLedger;
use crate::stats::repository::StatsRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn ParticipantLedger + Send + Sync>,
    pub stats_repository: Arc<dyn StatsRepository + Send + Sync>,
    pub config: Arc<GamificationConfig>,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn ParticipantLedger + Send + Sync>,
        stats_repository: Arc<dyn StatsRepository + Send + Sync>,
        config: Arc<GamificationConfig>,
    ) -> Self {
        Self {
            ledger,
            stats_repository,
            config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
