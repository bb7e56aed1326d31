use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::{
    CountSummary, EventStats, ParticipantDetail, ParticipantEventDetail, ParticipantStats,
};
use super::repository::StatsRepository;
use crate::shared::AppError;

/// Read-only aggregation over registrations and attendance. Every call
/// recomputes from committed data; nothing is cached or incrementally
/// maintained.
pub struct StatsService {
    repository: Arc<dyn StatsRepository + Send + Sync>,
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn summarize(counts: &[i64]) -> CountSummary {
    let max = counts.iter().copied().max().unwrap_or(0);
    let min = counts.iter().copied().min().unwrap_or(0);
    let average = if counts.is_empty() {
        0.0
    } else {
        round_one_decimal(counts.iter().sum::<i64>() as f64 / counts.len() as f64)
    };
    CountSummary { max, min, average }
}

fn attendance_rate(attendances: i64, registrations: i64) -> i32 {
    if registrations == 0 {
        return 0;
    }
    ((attendances as f64 / registrations as f64) * 100.0).round() as i32
}

impl StatsService {
    pub fn new(repository: Arc<dyn StatsRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Max/min/mean of per-event registration and attendance counts.
    /// An empty event set yields an all-zero result, not an error.
    #[instrument(skip(self))]
    pub async fn event_statistics(&self) -> Result<EventStats, AppError> {
        let event_ids = self.repository.event_ids().await?;

        if event_ids.is_empty() {
            debug!("No events, returning empty statistics");
            return Ok(EventStats::empty());
        }

        // One count pair per event, scanned fresh on every call
        let mut registration_counts = Vec::with_capacity(event_ids.len());
        let mut attendance_counts = Vec::with_capacity(event_ids.len());
        for event_id in &event_ids {
            registration_counts.push(self.repository.active_registration_count(*event_id).await?);
            attendance_counts.push(self.repository.attendance_count(*event_id).await?);
        }

        Ok(EventStats {
            total_events: event_ids.len() as i64,
            registrations: summarize(&registration_counts),
            attendance: summarize(&attendance_counts),
        })
    }

    /// Per-participant summary over all non-cancelled registrations, sorted
    /// by total registrations descending
    #[instrument(skip(self))]
    pub async fn participant_statistics(&self) -> Result<Vec<ParticipantStats>, AppError> {
        let registrations = self.repository.active_registrations().await?;

        if registrations.is_empty() {
            return Ok(Vec::new());
        }

        // Group by email, preserving first-seen order and names
        struct Grouped {
            first_name: String,
            last_name: String,
            registration_ids: Vec<Uuid>,
        }
        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Grouped> = HashMap::new();
        for registration in registrations {
            let entry = grouped
                .entry(registration.email.clone())
                .or_insert_with(|| {
                    order.push(registration.email.clone());
                    Grouped {
                        first_name: registration.first_name.clone(),
                        last_name: registration.last_name.clone(),
                        registration_ids: Vec::new(),
                    }
                });
            entry.registration_ids.push(registration.id);
        }

        let mut stats = Vec::with_capacity(order.len());
        for email in order {
            let group = &grouped[&email];
            let attended = self
                .repository
                .attended_registration_ids(&group.registration_ids)
                .await?;

            let total_registrations = group.registration_ids.len() as i64;
            let total_attendances = attended.len() as i64;

            stats.push(ParticipantStats {
                email,
                first_name: group.first_name.clone(),
                last_name: group.last_name.clone(),
                total_registrations,
                total_attendances,
                attendance_rate: attendance_rate(total_attendances, total_registrations),
            });
        }

        stats.sort_by(|a, b| b.total_registrations.cmp(&a.total_registrations));

        Ok(stats)
    }

    /// Every non-cancelled registration of one participant joined to its
    /// event, most recent event first. `None` when the participant has no
    /// non-cancelled registrations.
    #[instrument(skip(self))]
    pub async fn participant_details(
        &self,
        email: &str,
    ) -> Result<Option<ParticipantDetail>, AppError> {
        let registrations = self.repository.registrations_with_events(email).await?;

        if registrations.is_empty() {
            debug!(email = %email, "No registrations for participant");
            return Ok(None);
        }

        // Display name comes from the participant's registrations
        let named = self
            .repository
            .active_registrations()
            .await?
            .into_iter()
            .find(|r| r.email == email);
        let (first_name, last_name) = named
            .map(|r| (r.first_name, r.last_name))
            .unwrap_or_default();

        let registration_ids: Vec<Uuid> =
            registrations.iter().map(|r| r.registration_id).collect();
        let attended = self
            .repository
            .attended_registration_ids(&registration_ids)
            .await?;

        let events: Vec<ParticipantEventDetail> = registrations
            .iter()
            .map(|r| ParticipantEventDetail {
                event_id: r.event_id,
                event_title: r.event_title.clone(),
                event_date: r.event_date,
                registered: true,
                attended: attended.contains(&r.registration_id),
            })
            .collect();

        let total_registrations = registrations.len() as i64;
        let total_attendances = attended.len() as i64;

        Ok(Some(ParticipantDetail {
            stats: ParticipantStats {
                email: email.to_string(),
                first_name,
                last_name,
                total_registrations,
                total_attendances,
                attendance_rate: attendance_rate(total_attendances, total_registrations),
            },
            events,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::repository::InMemoryStatsRepository;
    use chrono::{TimeZone, Utc};

    fn date(day: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 18, 0, 0).unwrap()
    }

    fn service() -> (StatsService, Arc<InMemoryStatsRepository>) {
        let repo = Arc::new(InMemoryStatsRepository::new());
        (StatsService::new(repo.clone()), repo)
    }

    /// Seeds one event with `registered` active registrations for distinct
    /// emails, of which the first `attended` have attendance rows
    fn seed_event(repo: &InMemoryStatsRepository, registered: usize, attended: usize) -> Uuid {
        let event = Uuid::new_v4();
        repo.add_event(event, "Meetup", date(1));
        for i in 0..registered {
            let registration = Uuid::new_v4();
            repo.add_registration(
                registration,
                event,
                &format!("{}-{}@example.com", event, i),
                "P",
                "Q",
                false,
            );
            if i < attended {
                repo.add_attendance(registration);
            }
        }
        event
    }

    #[tokio::test]
    async fn empty_event_set_yields_all_zero_statistics() {
        let (service, _repo) = service();

        let stats = service.event_statistics().await.unwrap();

        assert_eq!(stats.total_events, 0);
        assert_eq!(stats.registrations, CountSummary::zero());
        assert_eq!(stats.attendance, CountSummary::zero());
    }

    #[tokio::test]
    async fn event_statistics_reports_max_min_and_rounded_mean() {
        let (service, repo) = service();
        seed_event(&repo, 4, 3);
        seed_event(&repo, 1, 0);
        seed_event(&repo, 2, 1);

        let stats = service.event_statistics().await.unwrap();

        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.registrations.max, 4);
        assert_eq!(stats.registrations.min, 1);
        // (4 + 1 + 2) / 3 = 2.333… → 2.3
        assert_eq!(stats.registrations.average, 2.3);
        assert_eq!(stats.attendance.max, 3);
        assert_eq!(stats.attendance.min, 0);
        // (3 + 0 + 1) / 3 = 1.333… → 1.3
        assert_eq!(stats.attendance.average, 1.3);
    }

    #[tokio::test]
    async fn cancelled_registrations_are_invisible_to_event_statistics() {
        let (service, repo) = service();
        let event = Uuid::new_v4();
        repo.add_event(event, "Meetup", date(1));
        let registration = Uuid::new_v4();
        repo.add_registration(registration, event, "a@example.com", "A", "A", true);
        repo.add_attendance(registration);

        let stats = service.event_statistics().await.unwrap();

        assert_eq!(stats.total_events, 1);
        assert_eq!(stats.registrations.max, 0);
        assert_eq!(stats.attendance.max, 0);
    }

    #[tokio::test]
    async fn participant_statistics_group_by_email_and_sort_by_registrations() {
        let (service, repo) = service();
        let event_a = Uuid::new_v4();
        let event_b = Uuid::new_v4();
        let event_c = Uuid::new_v4();
        repo.add_event(event_a, "A", date(1));
        repo.add_event(event_b, "B", date(2));
        repo.add_event(event_c, "C", date(3));

        // One registration for zoe, three for ana
        repo.add_registration(Uuid::new_v4(), event_a, "zoe@example.com", "Zoé", "L", false);
        for event in [event_a, event_b, event_c] {
            let registration = Uuid::new_v4();
            repo.add_registration(registration, event, "ana@example.com", "Ana", "M", false);
            if event != event_c {
                repo.add_attendance(registration);
            }
        }

        let stats = service.participant_statistics().await.unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].email, "ana@example.com");
        assert_eq!(stats[0].total_registrations, 3);
        assert_eq!(stats[0].total_attendances, 2);
        // 2/3 → 66.7% → 67
        assert_eq!(stats[0].attendance_rate, 67);
        assert_eq!(stats[1].email, "zoe@example.com");
        assert_eq!(stats[1].attendance_rate, 0);
    }

    #[tokio::test]
    async fn participant_statistics_empty_without_registrations() {
        let (service, _repo) = service();
        let stats = service.participant_statistics().await.unwrap();
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn participant_details_flags_attendance_and_computes_rate() {
        let (service, repo) = service();

        // Four events, four registrations, three attended
        let mut registration_ids = Vec::new();
        for day in 1..=4 {
            let event = Uuid::new_v4();
            repo.add_event(event, &format!("Event {}", day), date(day));
            let registration = Uuid::new_v4();
            repo.add_registration(registration, event, "max@example.com", "Max", "R", false);
            registration_ids.push(registration);
        }
        for registration in registration_ids.iter().take(3) {
            repo.add_attendance(*registration);
        }

        let detail = service
            .participant_details("max@example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(detail.stats.total_registrations, 4);
        assert_eq!(detail.stats.total_attendances, 3);
        assert_eq!(detail.stats.attendance_rate, 75);
        assert_eq!(detail.events.len(), 4);

        // Most recent event first
        assert_eq!(detail.events[0].event_title, "Event 4");
        assert_eq!(detail.events[3].event_title, "Event 1");
        for event in &detail.events {
            assert!(event.registered);
        }
        // The fourth (oldest) registration was attended, the most recent not
        assert!(!detail.events[0].attended);
        assert!(detail.events[3].attended);
    }

    #[tokio::test]
    async fn participant_details_none_for_unknown_email() {
        let (service, _repo) = service();

        let detail = service
            .participant_details("nobody@example.com")
            .await
            .unwrap();

        assert!(detail.is_none());
    }

    #[tokio::test]
    async fn participant_details_none_when_all_registrations_cancelled() {
        let (service, repo) = service();
        let event = Uuid::new_v4();
        repo.add_event(event, "Meetup", date(1));
        repo.add_registration(Uuid::new_v4(), event, "a@example.com", "A", "A", true);

        let detail = service.participant_details("a@example.com").await.unwrap();
        assert!(detail.is_none());
    }
}
