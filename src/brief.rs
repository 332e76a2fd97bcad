//! Production brief generation for one scored record.
//!
//! `build_prompt` is deterministic and offline. A `BriefWriter` turns the prompt
//! into text; without one (or when it fails) the prompt itself is returned so
//! the team can paste it into an assistant by hand.

use std::fmt::Write as _;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::profile::Profile;
use crate::record::ScoredRecord;

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_MODEL: &str = "BRIEF_MODEL";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
pub const API_VERSION: &str = "2023-06-01";
pub const MAX_TOKENS: u32 = 2000;

const BANNER_WIDTH: usize = 60;

/// Remote text generator used for briefs.
#[async_trait]
pub trait BriefWriter: Send + Sync {
    async fn write(&self, prompt: &str) -> Result<String>;
    /// Provider name for logs.
    fn name(&self) -> &'static str;
}

/// Prompt asking for a complete production brief for `record`.
pub fn build_prompt(profile: &Profile, record: &ScoredRecord) -> String {
    let item = &record.item;
    let or_na = |s: &str| if s.trim().is_empty() { "N/A".to_string() } else { s.to_string() };
    let flags = record
        .flags
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut p = String::new();
    let _ = writeln!(
        p,
        "You are a content production assistant for the channel \"{}\".\n",
        profile.display_name()
    );

    p.push_str("## Story\n");
    let _ = writeln!(p, "Title: {}", or_na(&item.title));
    let _ = writeln!(p, "Description: {}", or_na(&item.description));
    let _ = writeln!(p, "Source: {}", or_na(&item.source));
    let _ = writeln!(p, "Link: {}\n", or_na(&item.link));

    p.push_str("## Assessment\n");
    let _ = writeln!(p, "- Score: {}/100 ({})", record.score, record.status);
    let _ = writeln!(p, "- Hook potential: {} ({})", record.hook_kind, record.hook_label);
    let _ = writeln!(p, "- Reasons: {}", record.reasons.join(", "));
    let _ = writeln!(p, "- Flags: {flags}\n");

    p.push_str("## Channel DNA\n");
    let hooks = profile
        .hook_performance()
        .iter()
        .filter(|(_, d)| !d.description.is_empty())
        .map(|(k, d)| format!("{k} ({})", d.description))
        .collect::<Vec<_>>();
    if !hooks.is_empty() {
        let _ = writeln!(p, "- Proven hooks: {}", hooks.join(", "));
    }
    if let Some(regions) = profile.positive_keywords().get("regions") {
        if !regions.is_empty() {
            let _ = writeln!(p, "- Audience regions: {}", regions.join(", "));
        }
    }
    p.push_str("- Audience triggers: specific numbers, loss framing, hidden truth, regional relevance\n\n");

    p.push_str("## Deliverables\n\n");
    p.push_str("### 1. Titles (3 options)\nShort, gripping titles that include a number or a question.\n\n");
    let _ = writeln!(
        p,
        "### 2. Hook (first 15-20 seconds)\nOpen with a {} angle. Include one specific number, create urgency and tie it to the viewer.\n",
        record.hook_kind
    );
    p.push_str("### 3. Episode structure\n");
    p.push_str("| Time | Segment | Content |\n|------|---------|---------|\n");
    for (time, seg) in [
        ("0:00-0:30", "HOOK"),
        ("0:30-3:00", "PROOF"),
        ("3:00-7:00", "MECHANISM"),
        ("7:00-10:00", "STAKES"),
        ("10:00-13:00", "IMPLICATIONS"),
        ("13:00-15:00", "CTA"),
    ] {
        let _ = writeln!(p, "| {time} | {seg} | ... |");
    }
    p.push_str("\n### 4. Numbers to research\nStatistics and figures the team must verify.\n\n");
    p.push_str("### 5. Regional angle\nHow the story connects to the channel's audience regions.\n\n");
    p.push_str("### 6. Thumbnails (3 ideas)\n\n");
    p.push_str("### 7. Shorts (3 ideas)\nThree short-form angles cut from the episode.\n\n");
    p.push_str("---\nWrite the complete brief, ready for the team.\n");
    p
}

/// Brief text for `record`. Never fails: a missing or failing writer degrades to
/// the manual prompt.
pub async fn generate_brief(
    writer: Option<&dyn BriefWriter>,
    profile: &Profile,
    record: &ScoredRecord,
) -> String {
    let prompt = build_prompt(profile, record);
    let rule = "=".repeat(BANNER_WIDTH);
    let Some(w) = writer else {
        return format!(
            "Brief writer not configured. Set {ENV_API_KEY} to enable generation.\n\nMANUAL PROMPT\n{rule}\n\n{prompt}"
        );
    };
    match w.write(&prompt).await {
        Ok(text) => {
            tracing::info!(writer = w.name(), id = %record.item.id, "brief generated");
            text
        }
        Err(e) => {
            tracing::warn!(error = ?e, writer = w.name(), "brief generation failed");
            format!("Error generating brief: {e:#}\n\nPrompt saved for manual use:\n{rule}\n\n{prompt}")
        }
    }
}

/// Anthropic Messages API writer.
pub struct AnthropicWriter {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl AnthropicWriter {
    pub fn new(api_key: impl Into<String>, model: Option<&str>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("content-intel/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(120))
            .build()
            .context("building brief http client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            url: MESSAGES_URL.to_string(),
        })
    }

    /// Point at a different endpoint (proxies, test servers).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl BriefWriter for AnthropicWriter {
    async fn write(&self, prompt: &str) -> Result<String> {
        let req = Req {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };
        let resp = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&req)
            .send()
            .await
            .context("brief api request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("brief api returned {status}: {body}"));
        }
        let body: Resp = resp.json().await.context("decoding brief api response")?;
        body.content
            .into_iter()
            .find_map(|b| b.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("brief api returned no text"))
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}
