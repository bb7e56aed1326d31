pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::{
    CountSummary, EventStats, ParticipantDetail, ParticipantEventDetail, ParticipantStats,
};
pub use repository::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository};
pub use service::StatsService;
