//! Declarative rule tables for the scoring engine.
//!
//! Keyword rules read a category of the profile's positive keywords:
//! - `PerMatch`: bonus = distinct matches × weight, optionally capped
//! - `Flat`:     bonus = weight once, however many keywords match
//!
//! Hook rules carry a fixed bilingual word list. They are evaluated in table order
//! and the first one that matches decides the hook; inside a rule the first matching
//! word is reported and the bonus is never summed.
//!
//! All matching is a plain substring test against already-lowercased content.

use once_cell::sync::Lazy;
use regex::Regex;

use super::weights::{WeightKey, TOPIC_BONUS_CAP};
use crate::profile::Profile;
use crate::record::{Flag, HookKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bonus {
    PerMatch { cap: Option<u32> },
    Flat,
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub category: &'static str,
    pub label: &'static str,
    pub weight: WeightKey,
    pub bonus: Bonus,
    pub flag: Option<Flag>,
    /// How many matched keywords the reason lists.
    pub show: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct HookRule {
    pub kind: HookKind,
    pub label: &'static str,
    pub words: &'static [&'static str],
    pub weight: WeightKey,
    pub flag: Flag,
}

/// Outcome of one rule that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    pub bonus: u32,
    pub reason: String,
    pub flag: Option<Flag>,
}

pub const KEYWORD_RULES: [KeywordRule; 3] = [
    KeywordRule {
        category: "entities",
        label: "Entities",
        weight: WeightKey::EntityKeyword,
        bonus: Bonus::PerMatch { cap: None },
        flag: None,
        show: 3,
    },
    KeywordRule {
        category: "regions",
        label: "Regional",
        weight: WeightKey::RegionKeyword,
        bonus: Bonus::Flat,
        flag: Some(Flag::RegionalRelevance),
        show: 2,
    },
    KeywordRule {
        category: "topics",
        label: "Topics",
        weight: WeightKey::TopicKeyword,
        bonus: Bonus::PerMatch {
            cap: Some(TOPIC_BONUS_CAP),
        },
        flag: None,
        show: 3,
    },
];

pub const THREAT_WORDS: &[&str] = &[
    "خطر",
    "تهديد",
    "threat",
    "danger",
    "warning",
    "crisis",
    "انهيار",
    "collapse",
    "crash",
    "destroy",
    "devastating",
];

pub const REVEAL_WORDS: &[&str] = &[
    "سر",
    "خفي",
    "secret",
    "hidden",
    "revealed",
    "exposed",
    "truth",
    "actually",
    "really",
    "uncovered",
];

pub const STAKES_WORDS: &[&str] = &[
    "خسر",
    "فقد",
    "lost",
    "lose",
    "losing",
    "cost",
    "billion",
    "trillion",
    "مليار",
    "تريليون",
];

/// Checked in order; the first rule with a matching word wins.
pub const HOOK_RULES: [HookRule; 3] = [
    HookRule {
        kind: HookKind::ThreatClaim,
        label: "Threat angle",
        words: THREAT_WORDS,
        weight: WeightKey::ThreatAngle,
        flag: Flag::ThreatAngle,
    },
    HookRule {
        kind: HookKind::Reveal,
        label: "Reveal angle",
        words: REVEAL_WORDS,
        weight: WeightKey::RevealAngle,
        flag: Flag::RevealAngle,
    },
    HookRule {
        kind: HookKind::Stakes,
        label: "Stakes angle",
        words: STAKES_WORDS,
        weight: WeightKey::StakesAngle,
        flag: Flag::StakesAngle,
    },
];

/// Digits with optional thousand separators and decimals, optionally followed by a
/// magnitude/percent unit in English or Arabic.
static RE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:,\d+)*(?:\.\d+)?(?:\s*(?:مليار|مليون|billion|million|trillion|percent|%))?")
        .expect("numeric mention regex")
});

impl KeywordRule {
    pub fn evaluate(&self, content: &str, profile: &Profile) -> Option<RuleHit> {
        let hits = distinct_matches(content, profile.keywords(self.category));
        if hits.is_empty() {
            return None;
        }
        let weight = profile.weight(self.weight);
        let bonus = match self.bonus {
            Bonus::Flat => weight,
            Bonus::PerMatch { cap } => {
                let raw = weight.saturating_mul(hits.len() as u32);
                cap.map_or(raw, |c| raw.min(c))
            }
        };
        let shown = hits
            .iter()
            .take(self.show)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        Some(RuleHit {
            bonus,
            reason: format!("{}: {} (+{})", self.label, shown, bonus),
            flag: self.flag,
        })
    }
}

impl HookRule {
    pub fn evaluate(&self, content: &str, profile: &Profile) -> Option<RuleHit> {
        let word = self.words.iter().find(|w| content.contains(**w))?;
        let bonus = profile.weight(self.weight);
        Some(RuleHit {
            bonus,
            reason: format!("{}: '{}' (+{})", self.label, word, bonus),
            flag: Some(self.flag),
        })
    }
}

/// Specificity rule: two or more numeric mentions earn the full bonus and a flag,
/// a single mention earns the smaller one.
pub fn numbers_rule(content: &str, profile: &Profile) -> Option<RuleHit> {
    match count_numeric_mentions(content) {
        0 => None,
        1 => {
            let bonus = profile.weight(WeightKey::SingleNumber);
            Some(RuleHit {
                bonus,
                reason: format!("Has 1 number (+{bonus})"),
                flag: None,
            })
        }
        n => {
            let bonus = profile.weight(WeightKey::SpecificNumbers);
            Some(RuleHit {
                bonus,
                reason: format!("Specific numbers: {n} found (+{bonus})"),
                flag: Some(Flag::HasNumbers),
            })
        }
    }
}

/// Raw count of numeric mentions; repeated values count every time.
pub fn count_numeric_mentions(content: &str) -> usize {
    RE_NUMBER.find_iter(content).count()
}

/// First keyword (in list order) found in `content`.
pub fn first_match<'a>(content: &str, keywords: &'a [String]) -> Option<&'a str> {
    keywords
        .iter()
        .map(String::as_str)
        .find(|kw| keyword_in(content, kw))
}

/// Keywords found in `content`, in list order, case-insensitive duplicates removed.
pub fn distinct_matches<'a>(content: &str, keywords: &'a [String]) -> Vec<&'a str> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for kw in keywords {
        let lc = kw.to_lowercase();
        if seen.contains(&lc) {
            continue;
        }
        if keyword_in(content, kw) {
            seen.push(lc);
            out.push(kw.as_str());
        }
    }
    out
}

// Blank keywords would match everything, so they never match.
fn keyword_in(content: &str, keyword: &str) -> bool {
    if keyword.trim().is_empty() {
        return false;
    }
    content.contains(keyword.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(json: &str) -> Profile {
        Profile::from_json_str(json).unwrap()
    }

    #[test]
    fn numeric_mentions_count_raw_matches() {
        assert_eq!(count_numeric_mentions("no digits here"), 0);
        assert_eq!(count_numeric_mentions("threatening 500,000 driver jobs"), 1);
        assert_eq!(count_numeric_mentions("500,000 then 500,000 again"), 2);
        assert_eq!(count_numeric_mentions("gold at $3,500 and 40% inflation"), 2);
        assert_eq!(count_numeric_mentions("12.5 billion and 3 مليار"), 2);
    }

    #[test]
    fn unit_suffix_is_part_of_the_mention() {
        let m: Vec<_> = RE_NUMBER
            .find_iter("a $50 billion gap")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(m, vec!["50 billion"]);
    }

    #[test]
    fn region_rule_is_flat() {
        let p = profile(r#"{"positive_keywords":{"regions":["dubai","saudi","uae"]}}"#);
        let one = KEYWORD_RULES[1].evaluate("news from dubai", &p).unwrap();
        let three = KEYWORD_RULES[1]
            .evaluate("dubai, saudi and uae", &p)
            .unwrap();
        assert_eq!(one.bonus, 15);
        assert_eq!(three.bonus, 15);
        assert_eq!(three.reason, "Regional: dubai, saudi (+15)");
        assert_eq!(three.flag, Some(Flag::RegionalRelevance));
    }

    #[test]
    fn topic_rule_is_capped() {
        let topics: Vec<String> = (0..10).map(|i| format!("topic{i}x")).collect();
        let content = topics.join(" ");
        let p = profile(&serde_json::json!({ "positive_keywords": { "topics": topics } }).to_string());
        let hit = KEYWORD_RULES[2].evaluate(&content, &p).unwrap();
        assert_eq!(hit.bonus, 15);
        assert!(hit.reason.ends_with("(+15)"));
    }

    #[test]
    fn duplicates_and_blank_keywords_do_not_count() {
        let kws = vec!["Tesla".to_string(), "tesla".into(), "  ".into(), "".into()];
        assert_eq!(distinct_matches("tesla robotaxi", &kws), vec!["Tesla"]);
        assert_eq!(first_match("anything", &["".to_string()]), None);
    }

    #[test]
    fn hook_rule_reports_first_word_in_list_order() {
        let p = Profile::default();
        let hit = HOOK_RULES[0]
            .evaluate("a devastating crash warning", &p)
            .unwrap();
        assert_eq!(hit.reason, "Threat angle: 'warning' (+10)");
        assert_eq!(hit.bonus, 10);
        assert!(HOOK_RULES[1].evaluate("nothing to see", &p).is_none());
    }

    #[test]
    fn arabic_hook_words_match() {
        let p = Profile::default();
        let hit = HOOK_RULES[2].evaluate("خسر المستثمرون", &p).unwrap();
        assert_eq!(hit.flag, Some(Flag::StakesAngle));
    }
}
