use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::{BadgeSpec, LevelTier, PointsTable};
use super::models::Participant;
use super::rules::LevelInfo;

/// Request payload for awarding attendance points
#[derive(Debug, Deserialize)]
pub struct AwardAttendanceRequest {
    pub participant_id: Uuid,
    pub registration_id: Uuid,
}

/// Query parameters for the leaderboard endpoint
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// Participant record enriched with level information for client display.
/// The flattened participant keeps its column names; the enrichment is
/// camelCase on the wire.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    #[serde(flatten)]
    pub participant: Participant,
    pub level_info: LevelInfo,
}

/// Static gamification configuration exposed to the client
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub points: PointsTable,
    pub levels: Vec<LevelTier>,
    pub badges: Vec<BadgeSpec>,
}
