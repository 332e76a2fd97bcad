//! Orchestration: feeds → scoring → report → store, and brief generation
//! against the last run. All I/O lives here or below; `analyze`/`batch` stay pure.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use metrics::counter;

use crate::batch::{self, BatchResult, SelectError};
use crate::brief::{self, BriefWriter};
use crate::ingest::{self, config::FeedSettings, types::FeedSource, types::RawItem};
use crate::profile::Profile;
use crate::report::{self, ReportStore, SavedPaths, Summary};

/// Score `items` and record scoring counters.
pub fn score_items(items: &[RawItem], profile: &Profile) -> BatchResult {
    let out = batch::score_batch(items, profile);
    let rejected = out.iter().filter(|r| r.is_rejected()).count();
    counter!("scoring_items_total").increment(items.len() as u64);
    counter!("scoring_rejected_total").increment(rejected as u64);
    counter!("batch_duplicates_total").increment((items.len() - out.len()) as u64);
    out
}

/// Result of one scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: String,
    pub summary: Summary,
    pub paths: SavedPaths,
}

#[derive(Debug, Clone)]
pub struct BriefOutcome {
    pub text: String,
    pub path: PathBuf,
}

pub struct Scanner {
    profile: Arc<Profile>,
    feeds: Vec<Box<dyn FeedSource>>,
    settings: FeedSettings,
    store: ReportStore,
    writer: Option<Arc<dyn BriefWriter>>,
    last: Option<BatchResult>,
}

impl Scanner {
    pub fn new(profile: Arc<Profile>, store: ReportStore) -> Self {
        Self {
            profile,
            feeds: Vec::new(),
            settings: FeedSettings::default(),
            store,
            writer: None,
            last: None,
        }
    }

    pub fn with_feeds(mut self, feeds: Vec<Box<dyn FeedSource>>, settings: FeedSettings) -> Self {
        self.feeds = feeds;
        self.settings = settings;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn BriefWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn last(&self) -> Option<&BatchResult> {
        self.last.as_ref()
    }

    /// Fetch all feeds, then score/report/save.
    pub async fn run_scan(&mut self, now: DateTime<Utc>) -> Result<ScanOutcome> {
        tracing::info!(feeds = self.feeds.len(), "scan started");
        let items = ingest::run_once(&self.feeds, &self.settings, now).await;
        if items.is_empty() {
            bail!("no items fetched; check the feed configuration and network");
        }
        self.run_items(&items, now)
    }

    /// Same as a scan over the built-in sample set.
    pub fn run_sample(&mut self, now: DateTime<Utc>) -> Result<ScanOutcome> {
        tracing::info!("sample run started");
        self.run_items(&sample_items(now), now)
    }

    pub fn run_items(&mut self, items: &[RawItem], now: DateTime<Utc>) -> Result<ScanOutcome> {
        let batch = score_items(items, &self.profile);
        let summary = Summary::from_records(&batch);
        tracing::info!(
            scanned = items.len(),
            kept = batch.len(),
            high = summary.high_priority,
            consider = summary.consider,
            "batch scored"
        );
        let report = report::render_report(self.profile.display_name(), &batch, now);
        let paths = self.store.save(&report, &batch, now)?;
        self.last = Some(batch);
        Ok(ScanOutcome {
            report,
            summary,
            paths,
        })
    }

    /// Brief for the record at 1-based `rank` of the last run (in memory, else the
    /// newest saved run). The text is saved next to the reports.
    pub async fn brief(&mut self, rank: usize, now: DateTime<Utc>) -> Result<BriefOutcome> {
        if self.last.is_none() {
            self.last = self.store.load_latest()?;
        }
        let Some(last) = self.last.as_ref() else {
            return Err(SelectError::Empty.into());
        };
        let record = last.select(rank)?;
        let text = brief::generate_brief(self.writer.as_deref(), &self.profile, record).await;
        let path = self.store.save_brief(rank, &text, now)?;
        Ok(BriefOutcome { text, path })
    }
}

/// Ten representative headlines covering every tier and hook.
pub fn sample_items(now: DateTime<Utc>) -> Vec<RawItem> {
    let raw: [(&str, &str, &str, &str, i32); 10] = [
        (
            "Tesla Robotaxi Launch: Musk Announces 2026 Rollout in Dubai",
            "Elon Musk confirmed Tesla will launch its robotaxi service in Dubai by 2026, threatening 500,000 driver jobs in the Gulf region. The announcement comes as UAE accelerates autonomous vehicle testing.",
            "Reuters",
            "https://reuters.com/example1",
            1,
        ),
        (
            "Gold Hits $3,500 as Central Banks Stockpile Amid Dollar Concerns",
            "Gold prices reached record $3,500 per ounce as central banks, including Saudi Arabia and UAE, increase reserves. Analysts warn of potential dollar crisis.",
            "Bloomberg",
            "https://bloomberg.com/example2",
            1,
        ),
        (
            "Buy Now Pay Later Defaults Surge 40% in GCC Countries",
            "Tabby and Tamara report rising defaults among young consumers in Saudi Arabia and UAE. Hidden debt crisis threatens millions of families.",
            "Financial Times",
            "https://ft.com/example3",
            1,
        ),
        (
            "China Develops Hypersonic Missile That Can Evade US Defenses",
            "Pentagon officials warn new Chinese missile travels at Mach 10, capable of striking US carriers in first 20 minutes of conflict. $50 billion defense gap exposed.",
            "NYT",
            "https://nyt.com/example4",
            1,
        ),
        (
            "Apple Secret Project: AI-Powered Health Device Could Save Millions",
            "Leaked documents reveal Apple's hidden health monitoring device, capable of detecting heart attacks 30 minutes before they happen. FDA approval pending.",
            "TechCrunch",
            "https://techcrunch.com/example5",
            2,
        ),
        (
            "Local Chicago City Council Approves New Parking Meters",
            "Chicago aldermen voted 35-15 to approve new smart parking meters downtown.",
            "Chicago Tribune",
            "https://tribune.com/example6",
            3,
        ),
        (
            "NFL Week 15: Chiefs vs Bills Preview and Predictions",
            "Breaking down the key matchups for this Sunday's AFC showdown.",
            "ESPN",
            "https://espn.com/example7",
            3,
        ),
        (
            "Trump Threatens 100% Tariffs on China: Trade War 2.0 Begins",
            "President Trump announced sweeping new tariffs targeting $500 billion in Chinese imports. Beijing warns of immediate retaliation affecting Gulf oil exports.",
            "Reuters",
            "https://reuters.com/example8",
            1,
        ),
        (
            "Uber Investing $1.2 Billion to Replace Human Drivers with AI",
            "Internal documents reveal Uber's secret plan to phase out human drivers by 2030. 3 million Uber and Careem drivers in MENA region face uncertain future.",
            "Bloomberg",
            "https://bloomberg.com/example9",
            1,
        ),
        (
            "Egypt Currency Crisis: Pound Falls 15% in Single Day",
            "Egyptian pound crashed to record low as central bank loses control. Inflation expected to hit 40%. Millions of Egyptians face economic hardship.",
            "Al Jazeera",
            "https://aljazeera.com/example10",
            1,
        ),
    ];
    raw.into_iter()
        .map(|(title, desc, source, link, priority)| {
            RawItem::new(title, link)
                .with_description(desc)
                .with_source(source)
                .with_priority(priority)
                .with_published(now)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Status;

    const DNA: &str = r#"{
        "channel_name": "Test Channel",
        "positive_keywords": {
            "entities": ["Tesla", "Musk", "Uber", "Apple", "China"],
            "regions": ["Dubai", "Saudi", "UAE", "Gulf", "Egypt", "MENA"],
            "topics": ["robotaxi", "jobs", "AI", "tariffs", "gold"]
        },
        "negative_keywords": ["NFL"]
    }"#;

    fn scanner(dir: &std::path::Path) -> Scanner {
        let profile = Arc::new(Profile::from_json_str(DNA).unwrap());
        Scanner::new(profile, ReportStore::new(dir))
    }

    #[test]
    fn sample_run_saves_and_ranks() {
        let tmp = tempfile::tempdir().unwrap();
        let mut s = scanner(tmp.path());
        let out = s.run_sample(Utc::now()).unwrap();

        assert_eq!(out.summary.scanned, 10);
        assert_eq!(out.summary.auto_rejected, 1);
        assert!(out.paths.report.exists());
        assert!(out.paths.data.exists());
        let last = s.last().unwrap();
        let scores: Vec<u32> = last.iter().map(|r| r.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(last.iter().last().unwrap().status, Status::Reject);
    }

    #[tokio::test]
    async fn brief_falls_back_to_saved_run() {
        let tmp = tempfile::tempdir().unwrap();
        let now = Utc::now();
        scanner(tmp.path()).run_sample(now).unwrap();

        // fresh scanner: nothing in memory
        let mut s = scanner(tmp.path());
        let out = s.brief(1, now).await.unwrap();
        assert!(out.text.contains("MANUAL PROMPT"));
        assert!(out.path.exists());

        let err = s.brief(99, now).await.unwrap_err();
        assert_eq!(err.to_string(), "index out of range [1, 10]");
    }

    #[tokio::test]
    async fn brief_without_any_run_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = scanner(tmp.path()).brief(1, Utc::now()).await.unwrap_err();
        assert!(err.to_string().contains("run a scan first"));
    }

    #[tokio::test]
    async fn scan_without_feeds_reports_no_items() {
        let tmp = tempfile::tempdir().unwrap();
        let err = scanner(tmp.path()).run_scan(Utc::now()).await.unwrap_err();
        assert!(err.to_string().contains("no items fetched"));
    }
}
