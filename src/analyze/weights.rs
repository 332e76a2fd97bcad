//! Central table of scoring weights.
//!
//! Profile JSON shape (every entry optional):
//! {
//!   "positive_keyword_entity": 5,
//!   "positive_keyword_region": 15,
//!   "positive_keyword_topic": 3,
//!   "specific_numbers": 15,
//!   "single_number": 8,
//!   "threat_angle": 10,
//!   "reveal_angle": 8,
//!   "stakes_angle": 6,
//!   "priority_bonus": 5
//! }
//!
//! Any key the profile omits reads its default from `DEFAULT_WEIGHTS`.

use serde::Serialize;

/// Starting score of every non-rejected item.
pub const BASE_SCORE: u32 = 50;
/// Upper bound of the final score.
pub const MAX_SCORE: u32 = 100;
/// Ceiling of the topic bonus, whatever the per-topic weight.
pub const TOPIC_BONUS_CAP: u32 = 15;
/// Feed tier that earns the priority bonus.
pub const TOP_PRIORITY_TIER: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightKey {
    EntityKeyword,
    RegionKeyword,
    TopicKeyword,
    SpecificNumbers,
    SingleNumber,
    ThreatAngle,
    RevealAngle,
    StakesAngle,
    PriorityBonus,
}

/// `(key, default)` for every rule that carries a bonus.
pub const DEFAULT_WEIGHTS: [(WeightKey, u32); 9] = [
    (WeightKey::EntityKeyword, 5),
    (WeightKey::RegionKeyword, 15),
    (WeightKey::TopicKeyword, 3),
    (WeightKey::SpecificNumbers, 15),
    (WeightKey::SingleNumber, 8),
    (WeightKey::ThreatAngle, 10),
    (WeightKey::RevealAngle, 8),
    (WeightKey::StakesAngle, 6),
    (WeightKey::PriorityBonus, 5),
];

impl WeightKey {
    /// Name used in the profile's `scoring_weights` section.
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightKey::EntityKeyword => "positive_keyword_entity",
            WeightKey::RegionKeyword => "positive_keyword_region",
            WeightKey::TopicKeyword => "positive_keyword_topic",
            WeightKey::SpecificNumbers => "specific_numbers",
            WeightKey::SingleNumber => "single_number",
            WeightKey::ThreatAngle => "threat_angle",
            WeightKey::RevealAngle => "reveal_angle",
            WeightKey::StakesAngle => "stakes_angle",
            WeightKey::PriorityBonus => "priority_bonus",
        }
    }

    pub fn default_value(&self) -> u32 {
        DEFAULT_WEIGHTS
            .iter()
            .find(|(k, _)| k == self)
            .map(|(_, w)| *w)
            .unwrap_or(0)
    }
}
