//! Output shape of the scoring engine.
//!
//! `ScoredRecord` is the only contract surface toward rendering, persistence and
//! brief generation, so field names are kept stable for serialization.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ingest::types::RawItem;

/// Priority bucket derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    HighPriority,
    Consider,
    LowPriority,
    Skip,
    Reject,
}

impl Status {
    /// Non-overlapping thresholds: >=75, 55..75, 40..55, below 40.
    pub fn from_score(score: u32) -> Self {
        match score {
            75.. => Status::HighPriority,
            55..=74 => Status::Consider,
            40..=54 => Status::LowPriority,
            _ => Status::Skip,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::HighPriority => "HIGH_PRIORITY",
            Status::Consider => "CONSIDER",
            Status::LowPriority => "LOW_PRIORITY",
            Status::Skip => "SKIP",
            Status::Reject => "REJECT",
        }
    }

    /// HIGH_PRIORITY and CONSIDER are what reports treat as actionable.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Status::HighPriority | Status::Consider)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrative angle of an item. `None` is reserved for rejected items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    ThreatClaim,
    Reveal,
    Stakes,
    NewsPeg,
    None,
}

impl HookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::ThreatClaim => "threat_claim",
            HookKind::Reveal => "reveal",
            HookKind::Stakes => "stakes",
            HookKind::NewsPeg => "news_peg",
            HookKind::None => "none",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable tags summarizing which rule categories fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flag {
    AutoReject,
    RegionalRelevance,
    HasNumbers,
    ThreatAngle,
    RevealAngle,
    StakesAngle,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::AutoReject => "AUTO_REJECT",
            Flag::RegionalRelevance => "REGIONAL_RELEVANCE",
            Flag::HasNumbers => "HAS_NUMBERS",
            Flag::ThreatAngle => "THREAT_ANGLE",
            Flag::RevealAngle => "REVEAL_ANGLE",
            Flag::StakesAngle => "STAKES_ANGLE",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// Always within [0, 100].
    pub score: u32,
    pub status: Status,
    pub hook_kind: HookKind,
    /// Label from the profile's hook descriptors ("" when absent).
    #[serde(default)]
    pub hook_label: String,
    /// One entry per triggered rule, in evaluation order.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Insertion-ordered, no duplicates.
    #[serde(default)]
    pub flags: Vec<Flag>,
    pub item: RawItem,
}

impl ScoredRecord {
    /// Terminal record for a vetoed item.
    pub fn rejected(item: RawItem, keyword: &str) -> Self {
        Self {
            score: 0,
            status: Status::Reject,
            hook_kind: HookKind::None,
            hook_label: String::new(),
            reasons: vec![format!("Reject keyword: '{keyword}'")],
            flags: vec![Flag::AutoReject],
            item,
        }
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_rejected(&self) -> bool {
        self.status == Status::Reject
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_thresholds_do_not_overlap() {
        assert_eq!(Status::from_score(100), Status::HighPriority);
        assert_eq!(Status::from_score(75), Status::HighPriority);
        assert_eq!(Status::from_score(74), Status::Consider);
        assert_eq!(Status::from_score(55), Status::Consider);
        assert_eq!(Status::from_score(54), Status::LowPriority);
        assert_eq!(Status::from_score(40), Status::LowPriority);
        assert_eq!(Status::from_score(39), Status::Skip);
        assert_eq!(Status::from_score(0), Status::Skip);
    }

    #[test]
    fn serialized_shape_uses_stable_tags() {
        let rec = ScoredRecord::rejected(RawItem::new("NFL recap", "https://x.test/1"), "nfl");
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["score"], json!(0));
        assert_eq!(v["status"], json!("REJECT"));
        assert_eq!(v["hook_kind"], json!("none"));
        assert_eq!(v["flags"], json!(["AUTO_REJECT"]));
        assert_eq!(v["reasons"][0], json!("Reject keyword: 'nfl'"));
        assert_eq!(v["item"]["title"], json!("NFL recap"));
    }
}
