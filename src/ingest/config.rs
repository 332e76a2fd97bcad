// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::{DEFAULT_CATEGORY, DEFAULT_PRIORITY};

pub const ENV_PATH: &str = "RSS_FEEDS_PATH";

/// One configured RSS feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCfg {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_max_items")]
    pub max_items_per_feed: usize,
    #[serde(default = "default_max_age")]
    pub max_age_hours: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            max_items_per_feed: default_max_items(),
            max_age_hours: default_max_age(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedsConfig {
    #[serde(default)]
    pub feeds: Vec<FeedCfg>,
    #[serde(default)]
    pub settings: FeedSettings,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}
fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}
fn default_enabled() -> bool {
    true
}
fn default_max_items() -> usize {
    20
}
fn default_max_age() -> u64 {
    48
}

impl FeedCfg {
    /// Commented-out or template rows (`_comment`, `example.com`, empty url).
    fn is_placeholder(&self) -> bool {
        let url = self.url.trim();
        url.is_empty()
            || self.name.starts_with('_')
            || url.contains("example.com")
            || url.contains("YOUR_")
    }
}

impl FeedsConfig {
    /// Feeds that are enabled and not placeholders.
    pub fn active_feeds(&self) -> impl Iterator<Item = &FeedCfg> {
        self.feeds.iter().filter(|f| f.enabled && !f.is_placeholder())
    }
}

/// Load feed config from an explicit path. Supports TOML or JSON formats.
pub fn load_feeds_from(path: &Path) -> Result<FeedsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_feeds(&content, ext.as_str())
        .with_context(|| format!("parsing feeds config {}", path.display()))
}

/// Load feed config using env var + fallbacks:
/// 1) $RSS_FEEDS_PATH
/// 2) config/rss_feeds.json
/// 3) config/rss_feeds.toml
///
/// No file at all → empty config.
pub fn load_feeds_default() -> Result<FeedsConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_feeds_from(&pb);
        } else {
            return Err(anyhow!("{ENV_PATH} points to non-existent path"));
        }
    }
    for candidate in ["config/rss_feeds.json", "config/rss_feeds.toml"] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return load_feeds_from(&p);
        }
    }
    Ok(FeedsConfig::default())
}

fn parse_feeds(s: &str, hint_ext: &str) -> Result<FeedsConfig> {
    if hint_ext == "toml" {
        return parse_toml(s).or_else(|_| parse_json(s));
    }
    parse_json(s).or_else(|_| parse_toml(s))
}

fn parse_toml(s: &str) -> Result<FeedsConfig> {
    Ok(toml::from_str(s)?)
}

fn parse_json(s: &str) -> Result<FeedsConfig> {
    Ok(serde_json::from_str(s)?)
}
