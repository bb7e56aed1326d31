// Library crate for the event engagement server
// This file exposes the public API for integration tests

pub mod gamification;
pub mod shared;
pub mod stats;

use axum::{
    routing::{get, post},
    Router,
};

// Re-export commonly used types for easier access in tests
pub use gamification::{
    GamificationConfig, GamificationService, InMemoryParticipantLedger, ParticipantLedger,
};
pub use shared::{AppError, AppState};
pub use stats::{InMemoryStatsRepository, StatsRepository, StatsService};

/// Builds the full API router; shared between `main` and integration tests
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/gamification/award-attendance",
            post(gamification::handlers::award_attendance),
        )
        .route(
            "/api/gamification/participant/:email",
            get(gamification::handlers::get_participant),
        )
        .route(
            "/api/gamification/badges/:participant_id",
            get(gamification::handlers::get_badges),
        )
        .route(
            "/api/gamification/leaderboard",
            get(gamification::handlers::get_leaderboard),
        )
        .route(
            "/api/gamification/config",
            get(gamification::handlers::get_config),
        )
        .route(
            "/api/statistics/events",
            get(stats::handlers::get_event_statistics),
        )
        .route(
            "/api/statistics/participants",
            get(stats::handlers::get_participant_statistics),
        )
        .route(
            "/api/statistics/participants/:email",
            get(stats::handlers::get_participant_details),
        )
        .with_state(state)
}
