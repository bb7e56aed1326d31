use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::config::GamificationConfig;
use super::models::{AwardOutcome, Participant, ParticipantBadge};
use super::rules::plan_award;
use crate::shared::AppError;

/// Trait for the participant ledger: point totals, attendance counters and
/// awarded badges. Mutations go through `get_or_create` and
/// `award_attendance` only.
#[async_trait]
pub trait ParticipantLedger {
    /// Returns the participant for an email, creating one with the initial
    /// registration point grant (and the unconditional creation badges) if
    /// none exists. Idempotent by email.
    async fn get_or_create(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        config: &GamificationConfig,
    ) -> Result<Participant, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Participant>, AppError>;

    /// The attendance award protocol: atomically grants attendance points,
    /// bumps the attended counter, re-derives the level, writes the
    /// denormalized point columns on the registration and attendance rows,
    /// and inserts every newly eligible badge, all in one unit of work.
    ///
    /// Returns `None` when the participant does not exist; nothing is
    /// persisted in that case. Callers must not invoke this twice for the
    /// same attendance event; that boundary is theirs to enforce.
    async fn award_attendance(
        &self,
        participant_id: Uuid,
        registration_id: Uuid,
        config: &GamificationConfig,
    ) -> Result<Option<AwardOutcome>, AppError>;

    /// Badges for a participant, most recently earned first
    async fn badges(&self, participant_id: Uuid) -> Result<Vec<ParticipantBadge>, AppError>;

    /// Top participants by total points, descending
    async fn leaderboard(&self, limit: i64) -> Result<Vec<Participant>, AppError>;
}

#[derive(Default)]
struct LedgerState {
    participants: HashMap<Uuid, Participant>,
    badges: Vec<ParticipantBadge>,
    // Denormalized bookkeeping mirroring the registrations/attendance
    // point columns, keyed by registration id
    registration_points: HashMap<Uuid, i64>,
    attendance_points: HashMap<Uuid, i64>,
}

/// In-memory implementation of ParticipantLedger for development and testing.
///
/// All ledger state lives behind one mutex; an award builds its full
/// mutation set first and applies it in a single step at the end, so a
/// failure before that point leaves the ledger untouched.
pub struct InMemoryParticipantLedger {
    state: Mutex<LedgerState>,
    fail_next_award: AtomicBool,
}

impl Default for InMemoryParticipantLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryParticipantLedger {
    /// Creates a new empty in-memory ledger
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            fail_next_award: AtomicBool::new(false),
        }
    }

    /// Makes the next `award_attendance` call fail before its commit point.
    /// Lets tests observe that a failed award leaves no partial state.
    pub fn fail_next_award(&self) {
        self.fail_next_award.store(true, Ordering::SeqCst);
    }

    /// points_earned recorded on a registration row, if any
    pub fn registration_points_earned(&self, registration_id: Uuid) -> Option<i64> {
        let state = self.state.lock().unwrap();
        state.registration_points.get(&registration_id).copied()
    }

    /// points_awarded recorded on an attendance row, if any
    pub fn attendance_points_awarded(&self, registration_id: Uuid) -> Option<i64> {
        let state = self.state.lock().unwrap();
        state.attendance_points.get(&registration_id).copied()
    }

    /// Inserts a participant directly, bypassing the award protocol.
    /// Test seam for setting up counter states.
    pub fn insert_participant(&self, participant: Participant) {
        let mut state = self.state.lock().unwrap();
        state.participants.insert(participant.id, participant);
    }
}

#[async_trait]
impl ParticipantLedger for InMemoryParticipantLedger {
    #[instrument(skip(self, config))]
    async fn get_or_create(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        config: &GamificationConfig,
    ) -> Result<Participant, AppError> {
        let mut state = self.state.lock().unwrap();

        if let Some(existing) = state.participants.values().find(|p| p.email == email) {
            debug!(email = %email, "Participant already exists in memory");
            return Ok(existing.clone());
        }

        let participant = Participant {
            id: Uuid::new_v4(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            total_points: config.points.registration,
            level: 1,
            events_attended: 0,
            streak: 0,
            created_at: Utc::now(),
        };

        for spec in config.creation_badges() {
            state.badges.push(ParticipantBadge {
                id: Uuid::new_v4(),
                participant_id: participant.id,
                badge_type: spec.badge_type.to_string(),
                badge_name: spec.name.clone(),
                earned_at: Utc::now(),
            });
        }

        state
            .participants
            .insert(participant.id, participant.clone());

        debug!(email = %email, participant_id = %participant.id, "Participant created in memory");
        Ok(participant)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Participant>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.participants.values().find(|p| p.email == email).cloned())
    }

    #[instrument(skip(self, config))]
    async fn award_attendance(
        &self,
        participant_id: Uuid,
        registration_id: Uuid,
        config: &GamificationConfig,
    ) -> Result<Option<AwardOutcome>, AppError> {
        let mut state = self.state.lock().unwrap();

        let Some(participant) = state.participants.get(&participant_id).cloned() else {
            debug!(participant_id = %participant_id, "Participant not found, nothing to award");
            return Ok(None);
        };

        let plan = plan_award(config, &participant);

        // Check-then-insert: skip badges that already exist for this
        // participant. Everything below runs under the one ledger lock, so
        // two concurrent awards cannot both pass the check.
        let mut new_badges = Vec::new();
        for spec in &plan.eligible_badges {
            let badge_type = spec.badge_type.to_string();
            let already_awarded = state
                .badges
                .iter()
                .any(|b| b.participant_id == participant_id && b.badge_type == badge_type);
            if !already_awarded {
                new_badges.push(ParticipantBadge {
                    id: Uuid::new_v4(),
                    participant_id,
                    badge_type,
                    badge_name: spec.name.clone(),
                    earned_at: Utc::now(),
                });
            }
        }

        if self.fail_next_award.swap(false, Ordering::SeqCst) {
            warn!(participant_id = %participant_id, "Injected award failure before commit");
            return Err(AppError::DatabaseError(
                "Simulated failure during award".to_string(),
            ));
        }

        // Commit point: apply the whole mutation set at once
        let entry = state
            .participants
            .get_mut(&participant_id)
            .expect("participant vanished while the ledger lock was held");
        entry.total_points = plan.new_total_points;
        entry.events_attended = plan.new_events_attended;
        entry.level = plan.new_level.level;

        state
            .registration_points
            .insert(registration_id, config.points.registration);
        state
            .attendance_points
            .insert(registration_id, config.points.attendance);
        state.badges.extend(new_badges);

        debug!(
            participant_id = %participant_id,
            new_total = plan.new_total_points,
            new_level = plan.new_level.level,
            "Attendance award committed in memory"
        );

        Ok(Some(AwardOutcome {
            points: config.points.attendance,
            new_total: plan.new_total_points,
            level: plan.new_level,
        }))
    }

    #[instrument(skip(self))]
    async fn badges(&self, participant_id: Uuid) -> Result<Vec<ParticipantBadge>, AppError> {
        let state = self.state.lock().unwrap();
        let mut badges: Vec<ParticipantBadge> = state
            .badges
            .iter()
            .filter(|b| b.participant_id == participant_id)
            .cloned()
            .collect();
        badges.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        Ok(badges)
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: i64) -> Result<Vec<Participant>, AppError> {
        let state = self.state.lock().unwrap();
        let mut participants: Vec<Participant> = state.participants.values().cloned().collect();
        participants.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        participants.truncate(limit.max(0) as usize);
        Ok(participants)
    }
}

/// PostgreSQL implementation of the participant ledger
pub struct PostgresParticipantLedger {
    pool: PgPool,
}

impl PostgresParticipantLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantLedger for PostgresParticipantLedger {
    #[instrument(skip(self, config))]
    async fn get_or_create(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
        config: &GamificationConfig,
    ) -> Result<Participant, AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to open transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        let existing = sqlx::query_as::<_, Participant>(
            "SELECT id, email, first_name, last_name, total_points, level, events_attended, streak, created_at \
             FROM participants WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %email, "Failed to look up participant");
            AppError::DatabaseError(e.to_string())
        })?;

        if let Some(participant) = existing {
            tx.commit().await.map_err(|e| AppError::DatabaseError(e.to_string()))?;
            debug!(email = %email, "Participant already exists in database");
            return Ok(participant);
        }

        let participant = sqlx::query_as::<_, Participant>(
            "INSERT INTO participants (id, email, first_name, last_name, total_points, level, events_attended, streak) \
             VALUES ($1, $2, $3, $4, $5, 1, 0, 0) \
             RETURNING id, email, first_name, last_name, total_points, level, events_attended, streak, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(config.points.registration)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %email, "Failed to create participant");
            AppError::DatabaseError(e.to_string())
        })?;

        for spec in config.creation_badges() {
            sqlx::query(
                "INSERT INTO participant_badges (id, participant_id, badge_type, badge_name) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (participant_id, badge_type) DO NOTHING",
            )
            .bind(Uuid::new_v4())
            .bind(participant.id)
            .bind(spec.badge_type.to_string())
            .bind(&spec.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to grant creation badge");
                AppError::DatabaseError(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit participant creation");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(email = %email, participant_id = %participant.id, "Participant created in database");
        Ok(participant)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Participant>, AppError> {
        sqlx::query_as::<_, Participant>(
            "SELECT id, email, first_name, last_name, total_points, level, events_attended, streak, created_at \
             FROM participants WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, email = %email, "Failed to fetch participant");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, config))]
    async fn award_attendance(
        &self,
        participant_id: Uuid,
        registration_id: Uuid,
        config: &GamificationConfig,
    ) -> Result<Option<AwardOutcome>, AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to open award transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        // Row lock so concurrent awards for the same participant serialize
        // instead of losing point updates
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT id, email, first_name, last_name, total_points, level, events_attended, streak, created_at \
             FROM participants WHERE id = $1 FOR UPDATE",
        )
        .bind(participant_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, participant_id = %participant_id, "Failed to load participant for award");
            AppError::DatabaseError(e.to_string())
        })?;

        let Some(participant) = participant else {
            tx.rollback().await.map_err(|e| AppError::DatabaseError(e.to_string()))?;
            debug!(participant_id = %participant_id, "Participant not found, nothing to award");
            return Ok(None);
        };

        let plan = plan_award(config, &participant);

        sqlx::query(
            "UPDATE participants SET total_points = $1, events_attended = $2, level = $3 WHERE id = $4",
        )
        .bind(plan.new_total_points)
        .bind(plan.new_events_attended)
        .bind(plan.new_level.level)
        .bind(participant_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to update participant counters");
            AppError::DatabaseError(e.to_string())
        })?;

        // Denormalized bookkeeping on the surrounding tables; display fields,
        // never read back by the rules
        sqlx::query("UPDATE registrations SET points_earned = $1 WHERE id = $2")
            .bind(config.points.registration)
            .bind(registration_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to update registration points");
                AppError::DatabaseError(e.to_string())
            })?;

        sqlx::query("UPDATE attendance SET points_awarded = $1 WHERE registration_id = $2")
            .bind(config.points.attendance)
            .bind(registration_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to update attendance points");
                AppError::DatabaseError(e.to_string())
            })?;

        for spec in &plan.eligible_badges {
            let badge_type = spec.badge_type.to_string();

            // Fast-path existence check; the unique constraint on
            // (participant_id, badge_type) is the authoritative guard
            let already_awarded = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM participant_badges WHERE participant_id = $1 AND badge_type = $2",
            )
            .bind(participant_id)
            .bind(&badge_type)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to check existing badge");
                AppError::DatabaseError(e.to_string())
            })?;

            if already_awarded == 0 {
                sqlx::query(
                    "INSERT INTO participant_badges (id, participant_id, badge_type, badge_name) \
                     VALUES ($1, $2, $3, $4) \
                     ON CONFLICT (participant_id, badge_type) DO NOTHING",
                )
                .bind(Uuid::new_v4())
                .bind(participant_id)
                .bind(&badge_type)
                .bind(&spec.name)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    warn!(error = %e, badge_type = %badge_type, "Failed to insert badge");
                    AppError::DatabaseError(e.to_string())
                })?;
            }
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit award transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(
            participant_id = %participant_id,
            new_total = plan.new_total_points,
            new_level = plan.new_level.level,
            "Attendance award committed"
        );

        Ok(Some(AwardOutcome {
            points: config.points.attendance,
            new_total: plan.new_total_points,
            level: plan.new_level,
        }))
    }

    #[instrument(skip(self))]
    async fn badges(&self, participant_id: Uuid) -> Result<Vec<ParticipantBadge>, AppError> {
        sqlx::query_as::<_, ParticipantBadge>(
            "SELECT id, participant_id, badge_type, badge_name, earned_at \
             FROM participant_badges WHERE participant_id = $1 ORDER BY earned_at DESC",
        )
        .bind(participant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, participant_id = %participant_id, "Failed to fetch badges");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: i64) -> Result<Vec<Participant>, AppError> {
        sqlx::query_as::<_, Participant>(
            "SELECT id, email, first_name, last_name, total_points, level, events_attended, streak, created_at \
             FROM participants ORDER BY total_points DESC LIMIT $1",
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch leaderboard");
            AppError::DatabaseError(e.to_string())
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::gamification::config::BadgeType;
    use futures::future::join_all;
    use std::sync::Arc;

    fn config() -> GamificationConfig {
        GamificationConfig::default()
    }

    /// Seeds a participant with given counters, bypassing the award protocol
    fn seed_participant(
        ledger: &InMemoryParticipantLedger,
        total_points: i64,
        events_attended: i32,
    ) -> Participant {
        let participant = Participant {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", Uuid::new_v4()),
            first_name: "Test".to_string(),
            last_name: "Participant".to_string(),
            total_points,
            level: 1,
            events_attended,
            streak: 0,
            created_at: Utc::now(),
        };
        ledger.insert_participant(participant.clone());
        participant
    }

    #[tokio::test]
    async fn get_or_create_seeds_registration_points_and_first_event_badge() {
        let ledger = InMemoryParticipantLedger::new();

        let participant = ledger
            .get_or_create("marie@example.com", "Marie", "Dupont", &config())
            .await
            .unwrap();

        assert_eq!(participant.total_points, 10);
        assert_eq!(participant.level, 1);
        assert_eq!(participant.events_attended, 0);
        assert_eq!(participant.streak, 0);

        let badges = ledger.badges(participant.id).await.unwrap();
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].badge_type, BadgeType::FirstEvent.to_string());
        assert_eq!(badges[0].badge_name, "Premier Pas");
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent_by_email() {
        let ledger = InMemoryParticipantLedger::new();

        let first = ledger
            .get_or_create("marie@example.com", "Marie", "Dupont", &config())
            .await
            .unwrap();
        let second = ledger
            .get_or_create("marie@example.com", "Other", "Name", &config())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        // Existing record wins; the new names are ignored
        assert_eq!(second.first_name, "Marie");

        let badges = ledger.badges(first.id).await.unwrap();
        assert_eq!(badges.len(), 1);
    }

    #[tokio::test]
    async fn award_adds_attendance_points_and_bumps_counters() {
        let ledger = InMemoryParticipantLedger::new();
        let participant = seed_participant(&ledger, 0, 0);
        let registration_id = Uuid::new_v4();

        let outcome = ledger
            .award_attendance(participant.id, registration_id, &config())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.points, 50);
        assert_eq!(outcome.new_total, 50);
        assert_eq!(outcome.level.level, 2);

        let stored = ledger
            .find_by_email(&participant.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_points, 50);
        assert_eq!(stored.events_attended, 1);
        assert_eq!(stored.level, 2);
    }

    #[tokio::test]
    async fn award_writes_denormalized_point_columns() {
        let ledger = InMemoryParticipantLedger::new();
        let participant = seed_participant(&ledger, 0, 0);
        let registration_id = Uuid::new_v4();

        ledger
            .award_attendance(participant.id, registration_id, &config())
            .await
            .unwrap()
            .unwrap();

        // Fixed display values, not additive
        assert_eq!(ledger.registration_points_earned(registration_id), Some(10));
        assert_eq!(ledger.attendance_points_awarded(registration_id), Some(50));
    }

    #[tokio::test]
    async fn award_for_unknown_participant_changes_nothing() {
        let ledger = InMemoryParticipantLedger::new();
        let registration_id = Uuid::new_v4();

        let outcome = ledger
            .award_attendance(Uuid::new_v4(), registration_id, &config())
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(ledger.registration_points_earned(registration_id), None);
        assert_eq!(ledger.attendance_points_awarded(registration_id), None);
    }

    #[tokio::test]
    async fn badge_awarded_at_most_once_across_sequential_awards() {
        let ledger = InMemoryParticipantLedger::new();
        let participant = seed_participant(&ledger, 0, 4);

        // Fifth attendance: perfect_attendance threshold reached
        ledger
            .award_attendance(participant.id, Uuid::new_v4(), &config())
            .await
            .unwrap()
            .unwrap();
        // Sixth attendance: threshold still satisfied, badge must not repeat
        ledger
            .award_attendance(participant.id, Uuid::new_v4(), &config())
            .await
            .unwrap()
            .unwrap();

        let badges = ledger.badges(participant.id).await.unwrap();
        let perfect: Vec<_> = badges
            .iter()
            .filter(|b| b.badge_type == BadgeType::PerfectAttendance.to_string())
            .collect();
        assert_eq!(perfect.len(), 1);
    }

    #[tokio::test]
    async fn badge_awarded_at_most_once_across_concurrent_awards() {
        let ledger = Arc::new(InMemoryParticipantLedger::new());
        let participant = seed_participant(&ledger, 0, 4);

        let handles = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let participant_id = participant.id;
                tokio::spawn(async move {
                    ledger
                        .award_attendance(participant_id, Uuid::new_v4(), &config())
                        .await
                })
            })
            .collect::<Vec<_>>();

        let results = join_all(handles).await;
        for result in results {
            result.unwrap().unwrap().unwrap();
        }

        // No lost updates: every award landed
        let stored = ledger
            .find_by_email(&participant.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_points, 8 * 50);
        assert_eq!(stored.events_attended, 12);

        // No duplicate badges despite the concurrent check-then-insert
        let badges = ledger.badges(participant.id).await.unwrap();
        let mut types: Vec<&str> = badges.iter().map(|b| b.badge_type.as_str()).collect();
        let total = types.len();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), total);
    }

    #[tokio::test]
    async fn failed_award_leaves_no_partial_state() {
        let ledger = InMemoryParticipantLedger::new();
        let participant = seed_participant(&ledger, 100, 4);
        let registration_id = Uuid::new_v4();

        ledger.fail_next_award();
        let result = ledger
            .award_attendance(participant.id, registration_id, &config())
            .await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));

        // All-or-nothing: points, counters, bookkeeping and badges untouched
        let stored = ledger
            .find_by_email(&participant.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_points, 100);
        assert_eq!(stored.events_attended, 4);
        assert_eq!(ledger.registration_points_earned(registration_id), None);
        assert!(ledger.badges(participant.id).await.unwrap().is_empty());

        // The next award goes through normally
        let outcome = ledger
            .award_attendance(participant.id, registration_id, &config())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.new_total, 150);
    }

    #[tokio::test]
    async fn leaderboard_orders_by_total_points_descending() {
        let ledger = InMemoryParticipantLedger::new();
        seed_participant(&ledger, 300, 0);
        seed_participant(&ledger, 500, 0);
        seed_participant(&ledger, 150, 0);

        let top = ledger.leaderboard(3).await.unwrap();
        let totals: Vec<i64> = top.iter().map(|p| p.total_points).collect();
        assert_eq!(totals, vec![500, 300, 150]);
    }

    #[tokio::test]
    async fn leaderboard_honors_the_limit() {
        let ledger = InMemoryParticipantLedger::new();
        for points in [10, 20, 30, 40, 50] {
            seed_participant(&ledger, points, 0);
        }

        let top = ledger.leaderboard(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].total_points, 50);
        assert_eq!(top[1].total_points, 40);
    }

    #[tokio::test]
    async fn badges_are_ordered_most_recent_first() {
        let ledger = InMemoryParticipantLedger::new();
        let participant = seed_participant(&ledger, 450, 9);

        // 10th attendance crosses perfect_attendance, social_butterfly,
        // point_collector and level_5 at once
        ledger
            .award_attendance(participant.id, Uuid::new_v4(), &config())
            .await
            .unwrap()
            .unwrap();

        let badges = ledger.badges(participant.id).await.unwrap();
        assert_eq!(badges.len(), 4);
        for pair in badges.windows(2) {
            assert!(pair[0].earned_at >= pair[1].earned_at);
        }
    }
}
