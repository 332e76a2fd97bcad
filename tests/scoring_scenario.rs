// tests/scoring_scenario.rs
//
// End-to-end scoring behavior through the public API:
// - the Tesla/Dubai scenario adds up to 93
// - veto dominance, clamp, flat regional bonus, topic cap, hook precedence

use content_intel::{score, Flag, HookKind, Profile, RawItem, Status};

fn profile(json: &str) -> Profile {
    Profile::from_json_str(json).expect("valid profile json")
}

fn item(title: &str, description: &str, priority: i32) -> RawItem {
    RawItem::new(title, "https://news.test/story")
        .with_description(description)
        .with_source("Reuters")
        .with_priority(priority)
}

#[test]
fn tesla_robotaxi_scenario_scores_93() {
    let p = profile(
        r#"{
            "positive_keywords": { "entities": ["Tesla"], "regions": ["Dubai"] },
            "hook_performance": { "threat_claim": { "description": "Threat claim" } }
        }"#,
    );
    let it = item(
        "Tesla Robotaxi Launch",
        "Robotaxis are threatening 500,000 driver jobs across Dubai.",
        1,
    );

    let r = score(&it, &p);
    assert_eq!(r.score, 93, "reasons: {:?}", r.reasons);
    assert_eq!(r.status, Status::HighPriority);
    assert_eq!(r.hook_kind, HookKind::ThreatClaim);
    assert_eq!(r.hook_label, "Threat claim");
    assert_eq!(
        r.reasons,
        vec![
            "Entities: Tesla (+5)".to_string(),
            "Regional: Dubai (+15)".to_string(),
            "Has 1 number (+8)".to_string(),
            "Threat angle: 'threat' (+10)".to_string(),
        ]
    );
    assert_eq!(r.flags, vec![Flag::RegionalRelevance, Flag::ThreatAngle]);
    assert_eq!(r.item, it);
}

#[test]
fn negative_keyword_dominates_any_positive_signal() {
    let p = profile(
        r#"{
            "positive_keywords": { "entities": ["Tesla"], "regions": ["Dubai"], "topics": ["jobs"] },
            "negative_keywords": ["celebrity"]
        }"#,
    );
    let r = score(
        &item(
            "Celebrity buys Tesla in Dubai",
            "Secret deal worth 2 billion threatens 500 jobs",
            1,
        ),
        &p,
    );
    assert_eq!(r.score, 0);
    assert_eq!(r.status, Status::Reject);
    assert_eq!(r.hook_kind, HookKind::None);
    assert_eq!(r.hook_label, "");
    assert_eq!(r.flags, vec![Flag::AutoReject]);
    assert_eq!(r.reasons, vec!["Reject keyword: 'celebrity'".to_string()]);
}

#[test]
fn score_never_exceeds_100() {
    let p = profile(
        r#"{
            "positive_keywords": {
                "entities": ["alpha", "bravo", "charlie", "delta"],
                "regions": ["gulf"],
                "topics": ["oil", "gas", "gold", "debt", "jobs", "ai"]
            }
        }"#,
    );
    let r = score(
        &item(
            "Alpha Bravo Charlie Delta threat in the Gulf",
            "Oil, gas, gold, debt, jobs, AI: 1 2 3 4 billion",
            1,
        ),
        &p,
    );
    assert_eq!(r.score, 100);
    assert_eq!(r.status, Status::HighPriority);
}

#[test]
fn regional_bonus_is_flat_and_topic_bonus_is_capped() {
    let p = profile(
        r#"{
            "positive_keywords": {
                "regions": ["saudi", "uae", "qatar", "egypt"],
                "topics": ["oil", "gas", "gold", "debt", "jobs", "rates", "bonds"]
            }
        }"#,
    );
    let regional = score(&item("Saudi UAE Qatar Egypt summit", "", 2), &p);
    assert_eq!(regional.score, 65);
    assert!(regional.has_flag(Flag::RegionalRelevance));
    assert_eq!(regional.reasons, vec!["Regional: saudi, uae (+15)".to_string()]);

    let topical = score(&item("Oil gas gold debt jobs rates bonds", "", 2), &p);
    assert_eq!(topical.score, 65);
    assert_eq!(topical.reasons, vec!["Topics: oil, gas, gold (+15)".to_string()]);
}

#[test]
fn threat_takes_precedence_over_reveal_and_stakes() {
    let r = score(
        &item("Hidden crisis", "the secret truth about the lost billions", 2),
        &Profile::default(),
    );
    assert_eq!(r.hook_kind, HookKind::ThreatClaim);
    assert!(r.has_flag(Flag::ThreatAngle));
    assert!(!r.has_flag(Flag::RevealAngle));
    assert!(!r.has_flag(Flag::StakesAngle));
    assert_eq!(r.score, 60);
}

#[test]
fn profile_weights_override_defaults() {
    let p = profile(
        r#"{
            "positive_keywords": { "entities": ["uber"] },
            "scoring_weights": { "positive_keyword_entity": 20, "priority_bonus": 0, "single_number": -4 }
        }"#,
    );
    let r = score(&item("Uber cuts 300 roles", "", 1), &p);
    // 50 + 20 (entity) + 0 (single number, negative reads as 0) + 0 (priority)
    assert_eq!(r.score, 70);
    assert_eq!(r.status, Status::Consider);
}

#[test]
fn same_input_gives_identical_records() {
    let p = profile(r#"{"positive_keywords":{"entities":["Apple"],"topics":["AI"]}}"#);
    let it = item("Apple secret AI device", "Detects 30 of 40 heart attacks", 2);
    let a = score(&it, &p);
    let b = score(&it, &p);
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn entity_reason_lists_first_three_matches_but_counts_all() {
    let p = profile(r#"{"positive_keywords":{"entities":["alpha","bravo","charlie","delta"]}}"#);
    let r = score(&item("Alpha Bravo Charlie Delta merger", "", 2), &p);
    // 50 + 4 × 5
    assert_eq!(r.score, 70);
    assert_eq!(r.reasons, vec!["Entities: alpha, bravo, charlie (+20)".to_string()]);
}

#[test]
fn stakes_hook_applies_when_no_threat_or_reveal_word_matches() {
    let r = score(&item("Investors lost billions", "", 2), &Profile::default());
    assert_eq!(r.hook_kind, HookKind::Stakes);
    assert_eq!(r.flags, vec![Flag::StakesAngle]);
    assert_eq!(r.reasons, vec!["Stakes angle: 'lost' (+6)".to_string()]);
    assert_eq!(r.score, 56);
    assert_eq!(r.status, Status::Consider);
}
