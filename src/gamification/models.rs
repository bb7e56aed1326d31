use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::config::LevelTier;

/// Database model for the participants table.
///
/// `level` is derived from `total_points` but persisted redundantly so the
/// table can be queried without the level tables. `streak` is persisted but
/// no rule updates it yet.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub total_points: i64,
    pub level: i32,
    pub events_attended: i32,
    pub streak: i32,
    pub created_at: DateTime<Utc>,
}

/// Database model for the participant_badges table.
///
/// A row's existence is the sole source of truth for "already awarded";
/// (participant_id, badge_type) is unique.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ParticipantBadge {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub badge_type: String,
    pub badge_name: String,
    pub earned_at: DateTime<Utc>,
}

/// Result of a successful attendance award, serialized for the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardOutcome {
    pub points: i64,
    pub new_total: i64,
    pub level: LevelTier,
}
