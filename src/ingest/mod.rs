// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::config::FeedSettings;
use crate::ingest::types::{FeedSource, RawItem};
use chrono::{DateTime, TimeDelta, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Items kept from all feeds.");
        describe_counter!(
            "ingest_stale_total",
            "Items dropped for being older than max_age_hours."
        );
        describe_counter!("ingest_feed_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when ingest last ran.");
    });
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Max chars kept from any single text field.
pub const MAX_TEXT_CHARS: usize = 1500;

/// Clean feed text: decode entities, strip tags, ASCII quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    let mut out = RE_TAGS.replace_all(&decoded, "").into_owned();

    // “ ” « » → " and ‘ ’ → '
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    out = RE_WS.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > MAX_TEXT_CHARS {
        out = out.chars().take(MAX_TEXT_CHARS).collect();
    }
    out
}

/// Oldest publish time still accepted, or `None` when `max_age_hours` reaches
/// past the representable range (nothing is then stale).
pub fn age_cutoff(now: DateTime<Utc>, max_age_hours: u64) -> Option<DateTime<Utc>> {
    let cutoff = i64::try_from(max_age_hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .and_then(|age| now.checked_sub_signed(age));
    if cutoff.is_none() {
        tracing::warn!(max_age_hours, "max_age_hours out of range; age cutoff disabled");
    }
    cutoff
}

/// Apply per-feed limits to one feed's items: first `max_items_per_feed`, then the
/// age cutoff. Undated items are kept. Returns `(kept, stale_count)`.
pub fn apply_limits(
    items: Vec<RawItem>,
    settings: &FeedSettings,
    now: DateTime<Utc>,
) -> (Vec<RawItem>, usize) {
    let cutoff = age_cutoff(now, settings.max_age_hours);
    let mut stale = 0usize;
    let kept = items
        .into_iter()
        .take(settings.max_items_per_feed)
        .filter(|it| match (it.published, cutoff) {
            (Some(ts), Some(cutoff)) if ts < cutoff => {
                stale += 1;
                false
            }
            _ => true,
        })
        .collect();
    (kept, stale)
}

/// Fetch every feed once, apply limits and concatenate in feed order.
/// A failing feed is logged and counted; the others still run.
pub async fn run_once(
    feeds: &[Box<dyn FeedSource>],
    settings: &FeedSettings,
    now: DateTime<Utc>,
) -> Vec<RawItem> {
    ensure_metrics_described();

    let mut all = Vec::new();
    for feed in feeds {
        match feed.fetch_items().await {
            Ok(items) => {
                let (mut kept, stale) = apply_limits(items, settings, now);
                tracing::info!(feed = feed.name(), kept = kept.len(), stale, "feed fetched");
                counter!("ingest_items_total").increment(kept.len() as u64);
                counter!("ingest_stale_total").increment(stale as u64);
                all.append(&mut kept);
            }
            Err(e) => {
                tracing::warn!(error = ?e, feed = feed.name(), "feed error");
                counter!("ingest_feed_errors_total").increment(1);
            }
        }
    }

    gauge!("ingest_last_run_ts").set(now.timestamp().max(0) as f64);
    tracing::info!(items = all.len(), feeds = feeds.len(), "ingest finished");
    all
}
