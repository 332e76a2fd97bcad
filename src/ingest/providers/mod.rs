// src/ingest/providers/mod.rs
pub mod rss;

use anyhow::Result;

use crate::ingest::config::FeedsConfig;
use crate::ingest::types::FeedSource;

/// One HTTP-backed `RssFeed` per active feed in `cfg`.
pub fn build_feeds(cfg: &FeedsConfig) -> Result<Vec<Box<dyn FeedSource>>> {
    cfg.active_feeds()
        .map(|f| Ok(Box::new(rss::RssFeed::from_url(f.clone())?) as Box<dyn FeedSource>))
        .collect()
}
