use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Max/min/mean over a per-event count; `average` is rounded to one decimal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountSummary {
    pub max: i64,
    pub min: i64,
    pub average: f64,
}

impl CountSummary {
    pub fn zero() -> Self {
        Self {
            max: 0,
            min: 0,
            average: 0.0,
        }
    }
}

/// Cross-event registration and attendance summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total_events: i64,
    pub registrations: CountSummary,
    pub attendance: CountSummary,
}

impl EventStats {
    pub fn empty() -> Self {
        Self {
            total_events: 0,
            registrations: CountSummary::zero(),
            attendance: CountSummary::zero(),
        }
    }
}

/// Per-participant registration/attendance summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStats {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub total_registrations: i64,
    pub total_attendances: i64,
    /// Integer percentage, 0 when the participant has no registrations
    pub attendance_rate: i32,
}

/// One registration of a participant, joined to its event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantEventDetail {
    pub event_id: Uuid,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub registered: bool,
    pub attended: bool,
}

/// Full per-participant report: the summary plus every event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetail {
    #[serde(flatten)]
    pub stats: ParticipantStats,
    pub events: Vec<ParticipantEventDetail>,
}

/// A non-cancelled registration row as consumed by the aggregator
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationRecord {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A non-cancelled registration joined to its event
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationWithEvent {
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
}
