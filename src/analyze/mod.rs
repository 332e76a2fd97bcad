// src/analyze/mod.rs
//! Scoring engine entry: turns one raw item into a `ScoredRecord`.
//!
//! Order (each step may add to score, reasons and flags):
//! 1) lowercase `title + " " + description`
//! 2) negative keywords: first hit returns a terminal REJECT record
//! 3) base score
//! 4) keyword rules (entities, regions, topics)
//! 5) numeric specificity
//! 6) hook classification (threat → reveal → stakes → news_peg)
//! 7) priority feed bonus
//! 8) clamp, status tier, hook label
//!
//! Pure: no I/O, no shared state, same input → same output (reasons included).

pub mod rules;
pub mod weights;

use crate::ingest::types::RawItem;
use crate::profile::Profile;
use crate::record::{Flag, HookKind, ScoredRecord, Status};

pub use crate::analyze::rules::{RuleHit, HOOK_RULES, KEYWORD_RULES};
pub use crate::analyze::weights::{
    WeightKey, BASE_SCORE, DEFAULT_WEIGHTS, MAX_SCORE, TOP_PRIORITY_TIER,
};

/// Score one item against the profile.
pub fn score(item: &RawItem, profile: &Profile) -> ScoredRecord {
    let content = normalize_content(item);

    // (2) Veto
    if let Some(kw) = rules::first_match(&content, profile.negative_keywords()) {
        return ScoredRecord::rejected(item.clone(), kw);
    }

    let mut acc = Accumulator::new(BASE_SCORE);

    // (4) Positive keyword categories
    for rule in &KEYWORD_RULES {
        acc.apply(rule.evaluate(&content, profile));
    }

    // (5) Specificity
    acc.apply(rules::numbers_rule(&content, profile));

    // (6) Hook: first rule that fires decides
    let mut hook = HookKind::NewsPeg;
    for rule in &HOOK_RULES {
        if let Some(hit) = rule.evaluate(&content, profile) {
            hook = rule.kind;
            acc.apply(Some(hit));
            break;
        }
    }

    // (7) Priority feed: score only, no reason line
    if item.priority == TOP_PRIORITY_TIER {
        acc.bump(profile.weight(WeightKey::PriorityBonus));
    }

    // (8) Clamp + tier
    let score = acc.score.min(MAX_SCORE);

    ScoredRecord {
        score,
        status: Status::from_score(score),
        hook_kind: hook,
        hook_label: profile.hook_label(hook).to_string(),
        reasons: acc.reasons,
        flags: acc.flags,
        item: item.clone(),
    }
}

/// Lowercased `title + " " + description`; the text every rule matches against.
pub fn normalize_content(item: &RawItem) -> String {
    format!("{} {}", item.title, item.description).to_lowercase()
}

struct Accumulator {
    score: u32,
    reasons: Vec<String>,
    flags: Vec<Flag>,
}

impl Accumulator {
    fn new(base: u32) -> Self {
        Self {
            score: base,
            reasons: Vec::new(),
            flags: Vec::new(),
        }
    }

    fn apply(&mut self, hit: Option<RuleHit>) {
        let Some(hit) = hit else {
            return;
        };
        self.score = self.score.saturating_add(hit.bonus);
        self.reasons.push(hit.reason);
        if let Some(f) = hit.flag {
            if !self.flags.contains(&f) {
                self.flags.push(f);
            }
        }
    }

    fn bump(&mut self, bonus: u32) {
        self.score = self.score.saturating_add(bonus);
    }
}
