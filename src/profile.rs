//! # Channel DNA profile
//!
//! Typed, read-only view over the channel's content-affinity configuration:
//! positive keywords per category, veto keywords, scoring weights and hook
//! descriptors.
//!
//! - Loads from JSON or TOML (format picked by extension, the other one tried as fallback).
//! - Every section is optional: a missing section reads as empty, never as an error.
//! - Weight lookups fall back to the central table in `analyze::weights`.
//!
//! The profile is built once per run and shared read-only by every scoring call.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::weights::WeightKey;
use crate::record::HookKind;

pub const ENV_CHANNEL_DNA_PATH: &str = "CHANNEL_DNA_PATH";
pub const DEFAULT_CHANNEL_DNA_JSON: &str = "config/channel_dna.json";
pub const DEFAULT_CHANNEL_DNA_TOML: &str = "config/channel_dna.toml";

/// Display metadata for one hook kind. Annotation only, never scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookDescriptor {
    /// Label shown next to the hook kind in reports and briefs.
    #[serde(default)]
    pub description: String,
    /// Anything else the profile author keeps here (view counts, examples...).
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    channel_name: Option<String>,
    #[serde(default)]
    show_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    positive_keywords: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    negative_keywords: Vec<String>,
    #[serde(default)]
    scoring_weights: HashMap<String, i64>,
    #[serde(default)]
    hook_performance: BTreeMap<String, HookDescriptor>,
    #[serde(default)]
    winning_topics: Vec<serde_json::Value>,
    #[serde(default)]
    losing_topics: Vec<serde_json::Value>,
}

/// Diagnostic counts used by `check` and `GET /profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub channel_name: String,
    pub total_topics: usize,
    pub winning_topics: usize,
    pub losing_topics: usize,
    pub hook_patterns: usize,
    pub keywords_per_category: BTreeMap<String, usize>,
    pub negative_keywords: usize,
}

impl Profile {
    /// Load from an explicit path. `.toml` parses as TOML, anything else as JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading channel DNA from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let profile = parse_profile(&content, ext.as_str())
            .with_context(|| format!("parsing channel DNA at {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            channel = %profile.display_name(),
            categories = profile.positive_keywords.len(),
            negative = profile.negative_keywords.len(),
            "channel DNA loaded"
        );
        Ok(profile)
    }

    /// Resolve the profile location:
    /// 1) $CHANNEL_DNA_PATH
    /// 2) config/channel_dna.json
    /// 3) config/channel_dna.toml
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CHANNEL_DNA_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("CHANNEL_DNA_PATH points to non-existent path"));
        }
        for candidate in [DEFAULT_CHANNEL_DNA_JSON, DEFAULT_CHANNEL_DNA_TOML] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Self::load_from(&pb);
            }
        }
        Err(anyhow!(
            "no channel DNA found (set CHANNEL_DNA_PATH or add {DEFAULT_CHANNEL_DNA_JSON})"
        ))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Channel name with the fallbacks older profile files use.
    pub fn display_name(&self) -> &str {
        [&self.channel_name, &self.show_name, &self.name, &self.title]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("Not specified")
    }

    pub fn positive_keywords(&self) -> &BTreeMap<String, Vec<String>> {
        &self.positive_keywords
    }

    /// Keywords of one category; empty for unknown categories.
    pub fn keywords(&self, category: &str) -> &[String] {
        self.positive_keywords
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every positive keyword across categories (category order, then list order).
    pub fn all_positive_keywords(&self) -> Vec<&str> {
        self.positive_keywords
            .values()
            .flat_map(|v| v.iter().map(String::as_str))
            .collect()
    }

    pub fn negative_keywords(&self) -> &[String] {
        &self.negative_keywords
    }

    pub fn scoring_weights(&self) -> &HashMap<String, i64> {
        &self.scoring_weights
    }

    pub fn hook_performance(&self) -> &BTreeMap<String, HookDescriptor> {
        &self.hook_performance
    }

    pub fn winning_topics(&self) -> &[serde_json::Value] {
        &self.winning_topics
    }

    pub fn losing_topics(&self) -> &[serde_json::Value] {
        &self.losing_topics
    }

    /// Configured weight for `key`, or its default. Negative values read as 0.
    pub fn weight(&self, key: WeightKey) -> u32 {
        match self.scoring_weights.get(key.as_str()) {
            Some(&w) => u32::try_from(w.max(0)).unwrap_or(u32::MAX),
            None => key.default_value(),
        }
    }

    /// Display label for a hook kind; "" when the profile has none.
    pub fn hook_label(&self, kind: HookKind) -> &str {
        self.hook_performance
            .get(kind.as_str())
            .map(|d| d.description.as_str())
            .unwrap_or("")
    }

    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            channel_name: self.display_name().to_string(),
            total_topics: self.winning_topics.len() + self.losing_topics.len(),
            winning_topics: self.winning_topics.len(),
            losing_topics: self.losing_topics.len(),
            hook_patterns: self.hook_performance.len(),
            keywords_per_category: self
                .positive_keywords
                .iter()
                .map(|(k, v)| (k.clone(), v.len()))
                .collect(),
            negative_keywords: self.negative_keywords.len(),
        }
    }
}

fn parse_profile(s: &str, hint_ext: &str) -> Result<Profile> {
    if hint_ext == "toml" {
        return Profile::from_toml_str(s).or_else(|e| {
            Profile::from_json_str(s).map_err(|_| e.context("profile is neither TOML nor JSON"))
        });
    }
    Profile::from_json_str(s).or_else(|e| {
        Profile::from_toml_str(s).map_err(|_| e.context("profile is neither JSON nor TOML"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DNA_JSON: &str = r#"{
        "channel_name": "The Informant",
        "positive_keywords": {
            "entities": ["Tesla", "Musk"],
            "regions": ["Dubai", "Saudi"],
            "topics": ["AI"]
        },
        "negative_keywords": ["NFL", "celebrity"],
        "scoring_weights": { "positive_keyword_entity": 7, "threat_angle": -4 },
        "hook_performance": {
            "threat_claim": { "description": "Threat claim", "avg_views": 5600000 }
        },
        "winning_topics": [{"topic": "AI jobs"}]
    }"#;

    #[test]
    fn missing_sections_read_as_empty() {
        let p = Profile::from_json_str("{}").unwrap();
        assert!(p.positive_keywords().is_empty());
        assert!(p.negative_keywords().is_empty());
        assert!(p.scoring_weights().is_empty());
        assert!(p.hook_performance().is_empty());
        assert!(p.keywords("entities").is_empty());
        assert!(p.all_positive_keywords().is_empty());
        assert_eq!(p.display_name(), "Not specified");
    }

    #[test]
    fn weights_fall_back_to_defaults_and_floor_at_zero() {
        let p = Profile::from_json_str(DNA_JSON).unwrap();
        assert_eq!(p.weight(WeightKey::EntityKeyword), 7);
        assert_eq!(p.weight(WeightKey::RegionKeyword), 15);
        assert_eq!(p.weight(WeightKey::ThreatAngle), 0);
    }

    #[test]
    fn flatten_keeps_category_lists_intact() {
        let p = Profile::from_json_str(DNA_JSON).unwrap();
        let all = p.all_positive_keywords();
        assert_eq!(all, vec!["Tesla", "Musk", "Dubai", "Saudi", "AI"]);
        assert_eq!(p.keywords("regions"), ["Dubai", "Saudi"]);
    }

    #[test]
    fn hook_label_reads_description() {
        let p = Profile::from_json_str(DNA_JSON).unwrap();
        assert_eq!(p.hook_label(HookKind::ThreatClaim), "Threat claim");
        assert_eq!(p.hook_label(HookKind::Reveal), "");
        let d = &p.hook_performance()["threat_claim"];
        assert_eq!(d.extra["avg_views"], serde_json::json!(5600000));
    }

    #[test]
    fn toml_profile_parses() {
        let toml = r#"
show_name = "Almokhbir"
negative_keywords = ["gossip"]

[positive_keywords]
entities = ["Apple"]

[scoring_weights]
specific_numbers = 20
"#;
        let p = Profile::from_toml_str(toml).unwrap();
        assert_eq!(p.display_name(), "Almokhbir");
        assert_eq!(p.weight(WeightKey::SpecificNumbers), 20);
        assert_eq!(p.keywords("entities"), ["Apple"]);
    }

    #[test]
    fn summary_counts_sections() {
        let s = Profile::from_json_str(DNA_JSON).unwrap().summary();
        assert_eq!(s.channel_name, "The Informant");
        assert_eq!(s.total_topics, 1);
        assert_eq!(s.hook_patterns, 1);
        assert_eq!(s.keywords_per_category["entities"], 2);
        assert_eq!(s.negative_keywords, 2);
    }
}
