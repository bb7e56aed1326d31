use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::models::{EventStats, ParticipantDetail, ParticipantStats};
use super::service::StatsService;
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> StatsService {
    StatsService::new(Arc::clone(&state.stats_repository))
}

/// HTTP handler for cross-event statistics
///
/// GET /api/statistics/events
/// Returns max/min/average of per-event registration and attendance counts
#[instrument(name = "get_event_statistics", skip(state))]
pub async fn get_event_statistics(
    State(state): State<AppState>,
) -> Result<Json<EventStats>, AppError> {
    let stats = service(&state).event_statistics().await?;
    Ok(Json(stats))
}

/// HTTP handler for per-participant statistics
///
/// GET /api/statistics/participants
/// Returns one summary per participant, sorted by registrations descending
#[instrument(name = "get_participant_statistics", skip(state))]
pub async fn get_participant_statistics(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantStats>>, AppError> {
    let stats = service(&state).participant_statistics().await?;
    Ok(Json(stats))
}

/// HTTP handler for one participant's event history
///
/// GET /api/statistics/participants/:email
/// Returns the participant's registrations with attendance flags, or 404
#[instrument(name = "get_participant_details", skip(state))]
pub async fn get_participant_details(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ParticipantDetail>, AppError> {
    let detail = service(&state)
        .participant_details(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

    Ok(Json(detail))
}
