// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_PRIORITY: i32 = 2;

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

// `null` reads the same as an absent field.
fn null_as_empty<'de, D>(d: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// One ingested piece of content. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String, // may still carry markup
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String, // feed name, e.g. "Reuters"
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
    #[serde(default = "default_priority")]
    pub priority: i32, // 1 = most important feed tier
}

impl Default for RawItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            link: String::new(),
            source: String::new(),
            category: default_category(),
            published: None,
            priority: default_priority(),
        }
    }
}

impl RawItem {
    /// Minimal item with its id derived from `title + link`.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        let mut item = Self {
            title: title.into(),
            link: link.into(),
            ..Self::default()
        };
        item.id = Self::derive_id(&item.title, &item.link);
        item
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }

    /// Deterministic 12-hex-char id: SHA-256 over `title + link`, first 6 bytes.
    pub fn derive_id(title: &str, link: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        hasher.update(link.as_bytes());
        let digest = hasher.finalize();
        let mut out = String::with_capacity(12);
        for b in digest.iter().take(6) {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        out
    }

    /// Fill `id` when the producer did not supply one (e.g. HTTP input).
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = Self::derive_id(&self.title, &self.link);
        }
    }
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_items(&self) -> Result<Vec<RawItem>>;
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_and_short() {
        let a = RawItem::new("Gold hits record", "https://x.test/a");
        let b = RawItem::new("Gold hits record", "https://x.test/a");
        let c = RawItem::new("Gold hits record", "https://x.test/b");
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.len(), 12);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let it: RawItem =
            serde_json::from_str(r#"{"title":"Only a title","description":null}"#).unwrap();
        assert_eq!(it.description, "");
        assert_eq!(it.category, "general");
        assert_eq!(it.priority, 2);
        assert!(it.published.is_none());
        assert!(it.id.is_empty());
    }
}
