//! # Report rendering & persistence
//! Turns a `BatchResult` into the plain-text daily report, and stores runs on disk
//! so a later `brief <rank>` can pick them up without rescanning.
//!
//! Files under the output dir (`ts = YYYYmmdd_HHMM`):
//! - `report_<ts>.txt`  rendered report
//! - `data_<ts>.json`   `{ "timestamp": ..., "items": [top 50 records] }`
//! - `brief_<rank>_<ts>.md`

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use crate::batch::BatchResult;
use crate::ingest::normalize_text;
use crate::record::{Flag, HookKind, ScoredRecord, Status};

/// Records kept in a saved `data_*.json`.
pub const SAVED_RECORDS: usize = 50;
/// Entries per report section.
pub const SECTION_ITEMS: usize = 10;
pub const TOP_SOURCES: usize = 5;

const RULE_WIDTH: usize = 80;
const UNKNOWN_SOURCE: &str = "Unknown";

/// Aggregates of one run. Hook, regional and source figures cover the actionable
/// subset only (HIGH_PRIORITY + CONSIDER).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub scanned: usize,
    pub high_priority: usize,
    pub consider: usize,
    pub low_priority: usize,
    pub skipped: usize,
    pub auto_rejected: usize,
    /// REJECT + SKIP
    pub rejected: usize,
    pub hook_distribution: Vec<(HookKind, usize)>,
    pub regional: usize,
    pub top_sources: Vec<(String, usize)>,
}

impl Summary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ScoredRecord>,
    {
        let mut s = Summary::default();
        let mut hooks: BTreeMap<HookKind, usize> = BTreeMap::new();
        let mut sources: BTreeMap<String, usize> = BTreeMap::new();

        for r in records {
            s.scanned += 1;
            match r.status {
                Status::HighPriority => s.high_priority += 1,
                Status::Consider => s.consider += 1,
                Status::LowPriority => s.low_priority += 1,
                Status::Skip => s.skipped += 1,
                Status::Reject => s.auto_rejected += 1,
            }
            if !r.status.is_actionable() {
                continue;
            }
            *hooks.entry(r.hook_kind).or_default() += 1;
            if r.has_flag(Flag::RegionalRelevance) {
                s.regional += 1;
            }
            let src = match r.item.source.trim() {
                "" => UNKNOWN_SOURCE,
                other => other,
            };
            *sources.entry(src.to_string()).or_default() += 1;
        }
        s.rejected = s.skipped + s.auto_rejected;

        // BTreeMap iteration gives the secondary key; the stable sort keeps it.
        s.hook_distribution = hooks.into_iter().collect();
        s.hook_distribution.sort_by(|a, b| b.1.cmp(&a.1));
        s.top_sources = sources.into_iter().collect();
        s.top_sources.sort_by(|a, b| b.1.cmp(&a.1));
        s.top_sources.truncate(TOP_SOURCES);
        s
    }
}

/// Render the full text report for one run.
pub fn render_report(channel_name: &str, batch: &BatchResult, generated_at: DateTime<Utc>) -> String {
    let summary = Summary::from_records(batch);
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "CONTENT INTELLIGENCE REPORT | {channel_name}");
    let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "Items Scanned: {:>4}", summary.scanned);
    let _ = writeln!(
        out,
        "High Priority: {:>4} | Consider: {:>4} | Rejected: {:>4}",
        summary.high_priority, summary.consider, summary.rejected
    );
    let _ = writeln!(out, "{rule}\n");

    let high: Vec<&ScoredRecord> = batch
        .iter()
        .filter(|r| r.status == Status::HighPriority)
        .collect();
    let consider: Vec<&ScoredRecord> = batch
        .iter()
        .filter(|r| r.status == Status::Consider)
        .collect();

    section(&mut out, "HIGH PRIORITY", &high, false, "No high priority items found.");
    out.push('\n');
    section(&mut out, "CONSIDER", &consider, true, "No items to consider.");

    let _ = writeln!(out, "\n{rule}\nSUMMARY\n{rule}");
    out.push_str("\nHook Types Distribution:\n");
    for (hook, n) in &summary.hook_distribution {
        let _ = writeln!(out, "   - {hook}: {n}");
    }
    let _ = writeln!(out, "\nWith Regional Angle: {}", summary.regional);
    out.push_str("\nTop Sources:\n");
    for (src, n) in &summary.top_sources {
        let _ = writeln!(out, "   - {src}: {n}");
    }

    let _ = writeln!(out, "\n{rule}\nNext Steps:");
    out.push_str("   1. Review HIGH PRIORITY items\n");
    out.push_str("   2. Run: content-intel brief <rank> for a production brief\n");
    out.push_str("   3. Check items flagged REGIONAL_RELEVANCE for the regional angle\n");
    let _ = writeln!(out, "{rule}");
    out
}

fn section(out: &mut String, title: &str, records: &[&ScoredRecord], brief: bool, empty: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{rule}\n{title} ({} items)\n{rule}", records.len());
    for (i, r) in records.iter().take(SECTION_ITEMS).enumerate() {
        format_record(out, i + 1, r, brief);
    }
    if records.is_empty() {
        let _ = writeln!(out, "   {empty}");
    }
}

fn format_record(out: &mut String, index: usize, r: &ScoredRecord, brief: bool) {
    let item = &r.item;
    let source = if item.source.trim().is_empty() {
        UNKNOWN_SOURCE
    } else {
        item.source.as_str()
    };
    let date = item
        .published
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "No date".to_string());

    let _ = writeln!(out, "\n+-[{index}]{}", "-".repeat(RULE_WIDTH - 6));
    let _ = writeln!(
        out,
        "| Score: {}/100 | Hook: {} ({})",
        r.score, r.hook_kind, r.hook_label
    );
    let _ = writeln!(out, "| {}", truncate_chars(&item.title, 75));
    let _ = writeln!(out, "| Source: {source} | {date}");

    if !brief {
        let desc = normalize_text(&truncate_chars(&item.description, 200));
        let _ = writeln!(out, "|\n| {desc}...");
        out.push_str("|\n| Match Reasons:\n");
        for reason in r.reasons.iter().take(4) {
            let _ = writeln!(out, "|    {reason}");
        }
        if !r.flags.is_empty() {
            let flags = r
                .flags
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "|\n| Flags: {flags}");
        }
    }
    let _ = writeln!(out, "| Link: {}", truncate_chars(&item.link, 70));
    let _ = writeln!(out, "+{}", "-".repeat(RULE_WIDTH - 2));
}

fn truncate_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// On-disk shape of `data_*.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRun {
    pub timestamp: DateTime<Utc>,
    pub items: Vec<ScoredRecord>,
}

/// Paths written by one `ReportStore::save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPaths {
    pub report: PathBuf,
    pub data: PathBuf,
}

/// Directory-backed store for reports, run data and briefs.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating output dir {}", self.dir.display()))
    }

    pub fn save(&self, report: &str, batch: &BatchResult, at: DateTime<Utc>) -> Result<SavedPaths> {
        self.ensure_dir()?;
        let ts = stamp(at);

        let report_path = self.dir.join(format!("report_{ts}.txt"));
        fs::write(&report_path, report)
            .with_context(|| format!("writing report {}", report_path.display()))?;

        let run = SavedRun {
            timestamp: at,
            items: batch.iter().take(SAVED_RECORDS).cloned().collect(),
        };
        let data_path = self.dir.join(format!("data_{ts}.json"));
        let json = serde_json::to_string_pretty(&run).context("serializing run data")?;
        fs::write(&data_path, json)
            .with_context(|| format!("writing run data {}", data_path.display()))?;

        tracing::info!(report = %report_path.display(), data = %data_path.display(), "run saved");
        Ok(SavedPaths {
            report: report_path,
            data: data_path,
        })
    }

    /// Newest `data_*.json` (by file name) as a batch; `None` when there is none.
    pub fn load_latest(&self) -> Result<Option<BatchResult>> {
        if !self.dir.exists() {
            return Ok(None);
        }
        let mut runs: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("listing {}", self.dir.display()))?
        {
            let path = entry?.path();
            let is_run = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("data_") && n.ends_with(".json"));
            if is_run {
                runs.push(path);
            }
        }
        // Timestamped names sort chronologically.
        runs.sort();
        let Some(path) = runs.pop() else {
            return Ok(None);
        };
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading run data {}", path.display()))?;
        let run: SavedRun = serde_json::from_str(&raw)
            .with_context(|| format!("parsing run data {}", path.display()))?;
        tracing::info!(data = %path.display(), items = run.items.len(), "loaded saved run");
        Ok(Some(BatchResult::from_ranked(run.items)))
    }

    pub fn save_brief(&self, rank: usize, text: &str, at: DateTime<Utc>) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.dir.join(format!("brief_{rank}_{}.md", stamp(at)));
        fs::write(&path, text).with_context(|| format!("writing brief {}", path.display()))?;
        Ok(path)
    }
}

fn stamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::RawItem;
    use chrono::TimeZone;

    fn rec(title: &str, source: &str, score: u32, hook: HookKind, flags: Vec<Flag>) -> ScoredRecord {
        ScoredRecord {
            score,
            status: Status::from_score(score),
            hook_kind: hook,
            hook_label: String::new(),
            reasons: vec![],
            flags,
            item: RawItem::new(title, "https://x.test").with_source(source),
        }
    }

    #[test]
    fn summary_counts_actionable_subset_only() {
        let records = vec![
            rec("a", "Reuters", 90, HookKind::ThreatClaim, vec![Flag::RegionalRelevance]),
            rec("b", "Bloomberg", 60, HookKind::Reveal, vec![]),
            rec("c", "Reuters", 58, HookKind::ThreatClaim, vec![]),
            rec("d", "ESPN", 45, HookKind::Stakes, vec![Flag::RegionalRelevance]),
            rec("e", "", 30, HookKind::NewsPeg, vec![]),
            ScoredRecord::rejected(RawItem::new("f", ""), "NFL"),
        ];
        let s = Summary::from_records(&records);
        assert_eq!(s.scanned, 6);
        assert_eq!((s.high_priority, s.consider, s.low_priority), (1, 2, 1));
        assert_eq!(s.rejected, 2);
        assert_eq!(s.regional, 1);
        assert_eq!(
            s.hook_distribution,
            vec![(HookKind::ThreatClaim, 2), (HookKind::Reveal, 1)]
        );
        assert_eq!(
            s.top_sources,
            vec![("Reuters".to_string(), 2), ("Bloomberg".to_string(), 1)]
        );
    }

    #[test]
    fn report_lists_sections_and_strips_markup() {
        let mut top = rec("Tesla robotaxi", "Reuters", 93, HookKind::ThreatClaim, vec![Flag::HasNumbers]);
        top.item.description = "<p>Drivers <b>threatened</b></p>".into();
        top.reasons = vec!["Entities: Tesla (+5)".into()];
        let batch = BatchResult::from_ranked(vec![top]);
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let text = render_report("Test Channel", &batch, at);

        assert!(text.contains("Test Channel"));
        assert!(text.contains("Generated: 2026-03-01 09:30"));
        assert!(text.contains("HIGH PRIORITY (1 items)"));
        assert!(text.contains("No items to consider."));
        assert!(text.contains("Drivers threatened..."));
        assert!(text.contains("Flags: HAS_NUMBERS"));
        assert!(!text.contains("<b>"));
    }

    #[test]
    fn store_round_trips_latest_run() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ReportStore::new(tmp.path().join("out"));
        assert!(store.load_latest().unwrap().is_none());

        let older = BatchResult::from_ranked(vec![rec("old", "X", 70, HookKind::NewsPeg, vec![])]);
        let newer = BatchResult::from_ranked(vec![rec("new", "X", 80, HookKind::NewsPeg, vec![])]);
        let t1 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        store.save("r1", &older, t1).unwrap();
        let paths = store.save("r2", &newer, t2).unwrap();
        assert!(paths.report.ends_with("report_20260302_0900.txt"));

        let latest = store.load_latest().unwrap().unwrap();
        assert_eq!(latest.select(1).unwrap().item.title, "new");

        let brief = store.save_brief(1, "brief text", t2).unwrap();
        assert!(brief.ends_with("brief_1_20260302_0900.md"));
    }
}
