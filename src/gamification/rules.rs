//! Pure level and badge rules. No I/O; everything here is a function of the
//! injected configuration and the counters passed in.

use serde::{Deserialize, Serialize};

use super::config::{BadgeSpec, BadgeTrigger, GamificationConfig, LevelTier};
use super::models::Participant;

/// A participant's position in the level ladder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub current: LevelTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<LevelTier>,
    /// Percentage of the way from `current` to `next`, clamped to [0, 100].
    /// 100 when the participant sits on the last tier.
    pub progress: f64,
}

/// Resolves the level bracket for a cumulative point total.
///
/// Tiers are traversed in ascending threshold order and the match is kept
/// updated, so a total satisfying several thresholds resolves to the highest
/// qualifying tier. Always succeeds: the first tier has threshold 0.
pub fn level_info(config: &GamificationConfig, points: i64) -> LevelInfo {
    let mut current_index = 0;
    for (index, tier) in config.levels.iter().enumerate() {
        if points >= tier.min_points {
            current_index = index;
        }
    }

    let current = config.levels[current_index].clone();
    let next = config.levels.get(current_index + 1).cloned();

    let progress = match &next {
        Some(next_tier) => {
            let span = (next_tier.min_points - current.min_points) as f64;
            let gained = (points - current.min_points) as f64;
            (gained / span * 100.0).min(100.0)
        }
        None => 100.0,
    };

    LevelInfo {
        current,
        next,
        progress,
    }
}

/// Decides whether a badge trigger holds for the given counter value.
///
/// `Level` triggers derive the level from the value (a point total) rather
/// than reading the persisted level column.
pub fn badge_eligible(config: &GamificationConfig, trigger: BadgeTrigger, value: i64) -> bool {
    match trigger {
        BadgeTrigger::Always => true,
        BadgeTrigger::EventsAttended(threshold) => value >= threshold as i64,
        BadgeTrigger::TotalPoints(threshold) => value >= threshold,
        BadgeTrigger::Level(threshold) => level_info(config, value).current.level >= threshold,
    }
}

/// Everything the award protocol must persist for one attendance event
#[derive(Debug, Clone)]
pub struct AwardPlan {
    pub new_total_points: i64,
    pub new_events_attended: i32,
    pub new_level: LevelTier,
    /// Badges whose counter trigger holds against the new counters. Still
    /// subject to the already-awarded check inside the transaction.
    pub eligible_badges: Vec<BadgeSpec>,
}

/// Computes the state transition for one confirmed attendance: new point
/// total, new attended count, derived level, and the badges to evaluate.
///
/// Counter badges are checked against the *new* counters; `Always` badges
/// belong to the creation path and are skipped here.
pub fn plan_award(config: &GamificationConfig, participant: &Participant) -> AwardPlan {
    let new_total_points = participant.total_points + config.points.attendance;
    let new_events_attended = participant.events_attended + 1;
    let new_level = level_info(config, new_total_points).current;

    let eligible_badges = config
        .badges
        .iter()
        .filter(|spec| match spec.trigger {
            Some(trigger @ BadgeTrigger::EventsAttended(_)) => {
                badge_eligible(config, trigger, new_events_attended as i64)
            }
            Some(trigger @ (BadgeTrigger::TotalPoints(_) | BadgeTrigger::Level(_))) => {
                badge_eligible(config, trigger, new_total_points)
            }
            Some(BadgeTrigger::Always) | None => false,
        })
        .cloned()
        .collect();

    AwardPlan {
        new_total_points,
        new_events_attended,
        new_level,
        eligible_badges,
    }
}
