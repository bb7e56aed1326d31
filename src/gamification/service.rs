use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::config::GamificationConfig;
use super::models::{AwardOutcome, Participant, ParticipantBadge};
use super::repository::ParticipantLedger;
use super::rules::level_info;
use super::types::{ConfigResponse, ParticipantResponse};
use crate::shared::AppError;

const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Service for participant engagement: the award protocol, participant
/// lookups, badges, leaderboard and the static configuration. The
/// configuration is injected once at construction.
pub struct GamificationService {
    ledger: Arc<dyn ParticipantLedger + Send + Sync>,
    config: Arc<GamificationConfig>,
}

impl GamificationService {
    pub fn new(
        ledger: Arc<dyn ParticipantLedger + Send + Sync>,
        config: Arc<GamificationConfig>,
    ) -> Self {
        Self { ledger, config }
    }

    /// Runs the attendance award protocol for one confirmed attendance.
    ///
    /// Returns `None` when the participant does not exist. That is a normal
    /// "nothing to award" outcome, not an error. Must be called at most once
    /// per attendance event; that guarantee belongs to the attendance
    /// creation step upstream.
    #[instrument(skip(self))]
    pub async fn award_attendance_points(
        &self,
        participant_id: Uuid,
        registration_id: Uuid,
    ) -> Result<Option<AwardOutcome>, AppError> {
        let outcome = self
            .ledger
            .award_attendance(participant_id, registration_id, &self.config)
            .await?;

        match &outcome {
            Some(award) => info!(
                participant_id = %participant_id,
                points = award.points,
                new_total = award.new_total,
                level = award.level.level,
                "Attendance points awarded"
            ),
            None => debug!(participant_id = %participant_id, "No participant to award"),
        }

        Ok(outcome)
    }

    /// Returns the participant for an email, creating one with the initial
    /// registration point grant if unknown. Entry point for the registration
    /// flow; distinct from the attendance award path.
    #[instrument(skip(self))]
    pub async fn get_or_create_participant(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Participant, AppError> {
        self.ledger
            .get_or_create(email, first_name, last_name, &self.config)
            .await
    }

    /// Participant lookup enriched with level info, `None` when absent
    #[instrument(skip(self))]
    pub async fn participant_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ParticipantResponse>, AppError> {
        let Some(participant) = self.ledger.find_by_email(email).await? else {
            return Ok(None);
        };

        let level_info = level_info(&self.config, participant.total_points);
        Ok(Some(ParticipantResponse {
            participant,
            level_info,
        }))
    }

    #[instrument(skip(self))]
    pub async fn participant_badges(
        &self,
        participant_id: Uuid,
    ) -> Result<Vec<ParticipantBadge>, AppError> {
        self.ledger.badges(participant_id).await
    }

    /// Top participants by total points; `limit` defaults to 10
    #[instrument(skip(self))]
    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<Participant>, AppError> {
        let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
        self.ledger.leaderboard(limit).await
    }

    /// The static points/levels/badges tables for client display
    pub fn config_response(&self) -> ConfigResponse {
        ConfigResponse {
            points: self.config.points.clone(),
            levels: self.config.levels.clone(),
            badges: self.config.badges.clone(),
        }
    }
}
