use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Point grants for the different engagement actions.
///
/// `early_bird` and `streak_bonus` are part of the published points table
/// but no rule currently consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsTable {
    pub registration: i64,
    pub attendance: i64,
    pub early_bird: i64,
    pub streak_bonus: i64,
}

/// A level bracket: a minimum cumulative point threshold plus display metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTier {
    pub level: i32,
    pub min_points: i64,
    pub name: String,
    pub icon: String,
    pub color: String,
}

/// Badge identifiers, stored as snake_case strings in the database
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    FirstEvent,
    EarlyBird,
    PerfectAttendance,
    SocialButterfly,
    NetworkingPro,
    PointCollector,
    Level5,
}

/// Condition under which a badge is granted.
///
/// `Always` badges are granted once at participant creation; counter badges
/// are re-evaluated by the award protocol against the updated counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "threshold")]
pub enum BadgeTrigger {
    Always,
    EventsAttended(i32),
    TotalPoints(i64),
    Level(i32),
}

/// Catalog entry for a badge. `trigger` is `None` for badges that exist for
/// display purposes but have no automatic rule (early_bird).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeSpec {
    pub badge_type: BadgeType,
    pub name: String,
    pub icon: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<BadgeTrigger>,
}

/// Immutable gamification configuration injected into the award protocol and
/// the HTTP layer. Tests can construct alternative tiers and thresholds; the
/// `Default` impl carries the production tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationConfig {
    pub points: PointsTable,
    /// Tiers ordered ascending by `min_points`; the first tier starts at 0
    pub levels: Vec<LevelTier>,
    pub badges: Vec<BadgeSpec>,
}

impl GamificationConfig {
    /// Looks up the catalog entry for a badge type
    pub fn badge_spec(&self, badge_type: BadgeType) -> Option<&BadgeSpec> {
        self.badges.iter().find(|b| b.badge_type == badge_type)
    }

    /// Badges granted unconditionally when a participant is first created
    pub fn creation_badges(&self) -> impl Iterator<Item = &BadgeSpec> {
        self.badges
            .iter()
            .filter(|b| matches!(b.trigger, Some(BadgeTrigger::Always)))
    }
}

fn tier(level: i32, min_points: i64, name: &str, icon: &str, color: &str) -> LevelTier {
    LevelTier {
        level,
        min_points,
        name: name.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
    }
}

fn badge(
    badge_type: BadgeType,
    name: &str,
    icon: &str,
    description: &str,
    trigger: Option<BadgeTrigger>,
) -> BadgeSpec {
    BadgeSpec {
        badge_type,
        name: name.to_string(),
        icon: icon.to_string(),
        description: description.to_string(),
        trigger,
    }
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            points: PointsTable {
                registration: 10,
                attendance: 50,
                early_bird: 20,
                streak_bonus: 30,
            },
            levels: vec![
                tier(1, 0, "Débutant", "🌱", "slate"),
                tier(2, 50, "Novice", "⭐", "blue"),
                tier(3, 150, "Habitué", "🎯", "green"),
                tier(4, 300, "Expert", "💎", "purple"),
                tier(5, 500, "Maître", "👑", "yellow"),
                tier(6, 800, "Légende", "🏆", "orange"),
            ],
            badges: vec![
                badge(
                    BadgeType::FirstEvent,
                    "Premier Pas",
                    "🎉",
                    "Premier événement",
                    Some(BadgeTrigger::Always),
                ),
                badge(
                    BadgeType::EarlyBird,
                    "Lève-tôt",
                    "🌅",
                    "Inscription anticipée",
                    None,
                ),
                badge(
                    BadgeType::PerfectAttendance,
                    "Présence Parfaite",
                    "✨",
                    "5 présences consécutives",
                    Some(BadgeTrigger::EventsAttended(5)),
                ),
                badge(
                    BadgeType::SocialButterfly,
                    "Papillon Social",
                    "🦋",
                    "10 événements assistés",
                    Some(BadgeTrigger::EventsAttended(10)),
                ),
                badge(
                    BadgeType::NetworkingPro,
                    "Pro du Réseau",
                    "🤝",
                    "20 événements assistés",
                    Some(BadgeTrigger::EventsAttended(20)),
                ),
                badge(
                    BadgeType::PointCollector,
                    "Collectionneur",
                    "💰",
                    "500 points",
                    Some(BadgeTrigger::TotalPoints(500)),
                ),
                badge(
                    BadgeType::Level5,
                    "Niveau 5",
                    "👑",
                    "Atteindre le niveau 5",
                    Some(BadgeTrigger::Level(5)),
                ),
            ],
        }
    }
}
