// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::config::FeedCfg;
use crate::ingest::normalize_text;
use crate::ingest::types::{FeedSource, RawItem};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    summary: Option<String>,
}

/// RFC 2822 `pubDate` → UTC. Unparseable dates read as undated.
pub fn parse_pub_date(ts: &str) -> Option<DateTime<Utc>> {
    let dt = OffsetDateTime::parse(ts.trim(), &Rfc2822).ok()?;
    DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), 0)
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

/// RSS 2.0 feed. Items inherit source/category/priority from the feed config.
pub struct RssFeed {
    cfg: FeedCfg,
    mode: Mode,
}

impl RssFeed {
    /// Parse a fixed XML document instead of fetching.
    pub fn from_fixture(cfg: FeedCfg, xml: &str) -> Self {
        Self {
            cfg,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(cfg: FeedCfg) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("content-intel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building rss http client")?;
        Ok(Self {
            mode: Mode::Http {
                url: cfg.url.clone(),
                client,
            },
            cfg,
        })
    }

    pub fn config(&self) -> &FeedCfg {
        &self.cfg
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<RawItem>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml for {}", self.cfg.name))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let link = it.link.unwrap_or_default().trim().to_string();
            let mut item = RawItem::new(title, link);
            // Descriptions keep their markup; the report strips it when rendering.
            item.description = it.description.or(it.summary).unwrap_or_default();
            item.source = self.cfg.name.clone();
            item.category = self.cfg.category.clone();
            item.priority = self.cfg.priority;
            item.published = it.pub_date.as_deref().and_then(parse_pub_date);
            out.push(item);
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl FeedSource for RssFeed {
    async fn fetch_items(&self) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .with_context(|| format!("rss http get {url}"))?
                    .text()
                    .await
                    .context("rss http .text()")?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.cfg.name
    }
}

// quick-xml only knows the five XML entities.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
