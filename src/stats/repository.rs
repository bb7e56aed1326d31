use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::models::{RegistrationRecord, RegistrationWithEvent};
use crate::shared::AppError;

/// Read-only access to the event/registration/attendance tables owned by the
/// surrounding system. The aggregator recomputes from these on every call.
#[async_trait]
pub trait StatsRepository {
    async fn event_ids(&self) -> Result<Vec<Uuid>, AppError>;

    /// Non-cancelled registrations for one event
    async fn active_registration_count(&self, event_id: Uuid) -> Result<i64, AppError>;

    /// Attendance rows joined through non-cancelled registrations of one event
    async fn attendance_count(&self, event_id: Uuid) -> Result<i64, AppError>;

    /// All non-cancelled registrations, in storage order
    async fn active_registrations(&self) -> Result<Vec<RegistrationRecord>, AppError>;

    /// The subset of the given registration ids that have an attendance row
    async fn attended_registration_ids(
        &self,
        registration_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, AppError>;

    /// Non-cancelled registrations for one email joined to their events,
    /// ordered by event date descending
    async fn registrations_with_events(
        &self,
        email: &str,
    ) -> Result<Vec<RegistrationWithEvent>, AppError>;
}

#[derive(Debug, Clone)]
struct EventRow {
    id: Uuid,
    title: String,
    date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct RegistrationRow {
    id: Uuid,
    event_id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    cancelled: bool,
}

#[derive(Default)]
struct StatsState {
    events: Vec<EventRow>,
    registrations: Vec<RegistrationRow>,
    attendance: HashSet<Uuid>,
}

/// In-memory implementation of StatsRepository for development and testing,
/// seedable through the `add_*` methods
pub struct InMemoryStatsRepository {
    state: Mutex<StatsState>,
}

impl Default for InMemoryStatsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStatsRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StatsState::default()),
        }
    }

    pub fn add_event(&self, id: Uuid, title: &str, date: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        state.events.push(EventRow {
            id,
            title: title.to_string(),
            date,
        });
    }

    pub fn add_registration(
        &self,
        id: Uuid,
        event_id: Uuid,
        email: &str,
        first_name: &str,
        last_name: &str,
        cancelled: bool,
    ) {
        let mut state = self.state.lock().unwrap();
        state.registrations.push(RegistrationRow {
            id,
            event_id,
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            cancelled,
        });
    }

    pub fn add_attendance(&self, registration_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        state.attendance.insert(registration_id);
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    #[instrument(skip(self))]
    async fn event_ids(&self) -> Result<Vec<Uuid>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.events.iter().map(|e| e.id).collect())
    }

    #[instrument(skip(self))]
    async fn active_registration_count(&self, event_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id && !r.cancelled)
            .count() as i64)
    }

    #[instrument(skip(self))]
    async fn attendance_count(&self, event_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .registrations
            .iter()
            .filter(|r| {
                r.event_id == event_id && !r.cancelled && state.attendance.contains(&r.id)
            })
            .count() as i64)
    }

    #[instrument(skip(self))]
    async fn active_registrations(&self) -> Result<Vec<RegistrationRecord>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .registrations
            .iter()
            .filter(|r| !r.cancelled)
            .map(|r| RegistrationRecord {
                id: r.id,
                email: r.email.clone(),
                first_name: r.first_name.clone(),
                last_name: r.last_name.clone(),
            })
            .collect())
    }

    #[instrument(skip(self, registration_ids))]
    async fn attended_registration_ids(
        &self,
        registration_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(registration_ids
            .iter()
            .filter(|id| state.attendance.contains(id))
            .copied()
            .collect())
    }

    #[instrument(skip(self))]
    async fn registrations_with_events(
        &self,
        email: &str,
    ) -> Result<Vec<RegistrationWithEvent>, AppError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<RegistrationWithEvent> = state
            .registrations
            .iter()
            .filter(|r| r.email == email && !r.cancelled)
            .filter_map(|r| {
                state.events.iter().find(|e| e.id == r.event_id).map(|e| {
                    RegistrationWithEvent {
                        registration_id: r.id,
                        event_id: e.id,
                        event_title: e.title.clone(),
                        event_date: e.date,
                    }
                })
            })
            .collect();
        rows.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        Ok(rows)
    }
}

/// PostgreSQL implementation of StatsRepository
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self))]
    async fn event_ids(&self) -> Result<Vec<Uuid>, AppError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM events")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to list events");
                AppError::DatabaseError(e.to_string())
            })
    }

    #[instrument(skip(self))]
    async fn active_registration_count(&self, event_id: Uuid) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND cancelled = FALSE",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, event_id = %event_id, "Failed to count registrations");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn attendance_count(&self, event_id: Uuid) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance a \
             INNER JOIN registrations r ON a.registration_id = r.id \
             WHERE r.event_id = $1 AND r.cancelled = FALSE",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, event_id = %event_id, "Failed to count attendance");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn active_registrations(&self) -> Result<Vec<RegistrationRecord>, AppError> {
        sqlx::query_as::<_, RegistrationRecord>(
            "SELECT id, email, first_name, last_name FROM registrations WHERE cancelled = FALSE",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list registrations");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, registration_ids))]
    async fn attended_registration_ids(
        &self,
        registration_ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT registration_id FROM attendance WHERE registration_id = ANY($1)",
        )
        .bind(registration_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch attendance rows");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(ids.into_iter().collect())
    }

    #[instrument(skip(self))]
    async fn registrations_with_events(
        &self,
        email: &str,
    ) -> Result<Vec<RegistrationWithEvent>, AppError> {
        sqlx::query_as::<_, RegistrationWithEvent>(
            "SELECT r.id AS registration_id, e.id AS event_id, e.title AS event_title, \
                    e.event_date AS event_date \
             FROM registrations r \
             INNER JOIN events e ON r.event_id = e.id \
             WHERE r.email = $1 AND r.cancelled = FALSE \
             ORDER BY e.event_date DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %email, "Failed to fetch participant registrations");
            AppError::DatabaseError(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 18, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn counts_exclude_cancelled_registrations() {
        let repo = InMemoryStatsRepository::new();
        let event = Uuid::new_v4();
        repo.add_event(event, "Meetup", date(1));

        let active = Uuid::new_v4();
        let cancelled = Uuid::new_v4();
        repo.add_registration(active, event, "a@example.com", "A", "A", false);
        repo.add_registration(cancelled, event, "b@example.com", "B", "B", true);
        repo.add_attendance(active);
        repo.add_attendance(cancelled);

        assert_eq!(repo.active_registration_count(event).await.unwrap(), 1);
        // Attendance joined through a cancelled registration does not count
        assert_eq!(repo.attendance_count(event).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn attended_ids_are_restricted_to_the_requested_set() {
        let repo = InMemoryStatsRepository::new();
        let attended = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.add_attendance(attended);
        repo.add_attendance(other);

        let result = repo
            .attended_registration_ids(&[attended, Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert!(result.contains(&attended));
    }

    #[tokio::test]
    async fn registrations_with_events_sorted_by_date_descending() {
        let repo = InMemoryStatsRepository::new();
        let older = Uuid::new_v4();
        let newer = Uuid::new_v4();
        repo.add_event(older, "Older", date(1));
        repo.add_event(newer, "Newer", date(20));

        repo.add_registration(Uuid::new_v4(), older, "a@example.com", "A", "A", false);
        repo.add_registration(Uuid::new_v4(), newer, "a@example.com", "A", "A", false);

        let rows = repo.registrations_with_events("a@example.com").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].event_title, "Newer");
        assert_eq!(rows[1].event_title, "Older");
    }

    #[tokio::test]
    async fn registrations_with_events_skips_cancelled_and_other_emails() {
        let repo = InMemoryStatsRepository::new();
        let event = Uuid::new_v4();
        repo.add_event(event, "Meetup", date(5));

        repo.add_registration(Uuid::new_v4(), event, "a@example.com", "A", "A", true);
        repo.add_registration(Uuid::new_v4(), event, "b@example.com", "B", "B", false);

        let rows = repo.registrations_with_events("a@example.com").await.unwrap();
        assert!(rows.is_empty());
    }
}
