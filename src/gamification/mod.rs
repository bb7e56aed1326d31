pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod rules;
pub mod service;
pub mod types;

pub use config::{BadgeSpec, BadgeTrigger, BadgeType, GamificationConfig, LevelTier, PointsTable};
pub use models::{AwardOutcome, Participant, ParticipantBadge};
pub use repository::{InMemoryParticipantLedger, ParticipantLedger, PostgresParticipantLedger};
pub use rules::{badge_eligible, level_info, plan_award, AwardPlan, LevelInfo};
pub use service::GamificationService;
