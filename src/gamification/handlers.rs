use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::models::{AwardOutcome, Participant, ParticipantBadge};
use super::service::GamificationService;
use super::types::{AwardAttendanceRequest, ConfigResponse, LeaderboardQuery, ParticipantResponse};
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> GamificationService {
    GamificationService::new(Arc::clone(&state.ledger), Arc::clone(&state.config))
}

/// HTTP handler for awarding attendance points
///
/// POST /api/gamification/award-attendance
/// Returns the points granted, the new total and the new level,
/// or 404 when the participant does not exist
#[instrument(name = "award_attendance", skip(state))]
pub async fn award_attendance(
    State(state): State<AppState>,
    Json(request): Json<AwardAttendanceRequest>,
) -> Result<Json<AwardOutcome>, AppError> {
    info!(
        participant_id = %request.participant_id,
        registration_id = %request.registration_id,
        "Awarding attendance points"
    );

    let outcome = service(&state)
        .award_attendance_points(request.participant_id, request.registration_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

    info!(
        participant_id = %request.participant_id,
        new_total = outcome.new_total,
        "Attendance points awarded successfully"
    );

    Ok(Json(outcome))
}

/// HTTP handler for fetching a participant by email
///
/// GET /api/gamification/participant/:email
/// Returns the participant enriched with level info, or 404
#[instrument(name = "get_participant", skip(state))]
pub async fn get_participant(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<ParticipantResponse>, AppError> {
    let participant = service(&state)
        .participant_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

    Ok(Json(participant))
}

/// HTTP handler for listing a participant's badges
///
/// GET /api/gamification/badges/:participant_id
/// Returns badge rows ordered by earned_at descending
#[instrument(name = "get_badges", skip(state))]
pub async fn get_badges(
    State(state): State<AppState>,
    Path(participant_id): Path<Uuid>,
) -> Result<Json<Vec<ParticipantBadge>>, AppError> {
    let badges = service(&state).participant_badges(participant_id).await?;
    Ok(Json(badges))
}

/// HTTP handler for the leaderboard
///
/// GET /api/gamification/leaderboard?limit=N
/// Returns the top N participants by total points (default 10)
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<Participant>>, AppError> {
    let leaderboard = service(&state).leaderboard(query.limit).await?;

    info!(entries = leaderboard.len(), "Leaderboard fetched");

    Ok(Json(leaderboard))
}

/// HTTP handler for the static gamification configuration
///
/// GET /api/gamification/config
/// Returns the points table, level tiers and badge catalog
#[instrument(name = "get_config", skip(state))]
pub async fn get_config(State(state): State<AppState>) -> Result<Json<ConfigResponse>, AppError> {
    Ok(Json(service(&state).config_response()))
}
