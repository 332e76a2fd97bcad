//! Content Intelligence: binary entrypoint.
//! Loads `.env`, the channel DNA and feed config, then runs one CLI command.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use content_intel::api::{self, AppState};
use content_intel::brief::{AnthropicWriter, BriefWriter};
use content_intel::config::AppConfig;
use content_intel::ingest::config::{load_feeds_default, load_feeds_from, FeedsConfig};
use content_intel::ingest::providers::build_feeds;
use content_intel::metrics::Metrics;
use content_intel::pipeline::Scanner;
use content_intel::profile::Profile;
use content_intel::report::ReportStore;

#[derive(Parser, Debug)]
#[command(
    name = "content-intel",
    about = "Score news feeds against a channel DNA and rank production ideas",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all feeds, score, save the report (default command)
    Scan,
    /// Run against the built-in sample headlines
    Sample,
    /// Generate a production brief for a ranked item of the last run
    Brief {
        /// 1-based rank in the last run
        rank: usize,
    },
    /// Verify the channel DNA and feed configuration
    Check,
    /// Start the HTTP service
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

/// RUST_LOG (default `content_intel=info,warn`); JSON lines when LOG_FORMAT=json.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("content_intel=info,warn"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

fn load_profile(cfg: &AppConfig) -> Result<Profile> {
    match &cfg.dna_path {
        Some(p) => Profile::load_from(p),
        None => Profile::load_default(),
    }
}

fn load_feeds(cfg: &AppConfig) -> Result<FeedsConfig> {
    match &cfg.feeds_path {
        Some(p) => load_feeds_from(p),
        None => load_feeds_default(),
    }
}

fn writer(cfg: &AppConfig) -> Result<Option<Arc<dyn BriefWriter>>> {
    let Some(key) = cfg.api_key.as_deref() else {
        return Ok(None);
    };
    let w = AnthropicWriter::new(key, Some(&cfg.brief_model))?;
    Ok(Some(Arc::new(w)))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let mut cfg = AppConfig::from_env()?;
    let profile = Arc::new(load_profile(&cfg).context("loading channel DNA")?);
    let store = ReportStore::new(&cfg.output_dir);

    match cli.command.unwrap_or(Command::Scan) {
        Command::Scan => {
            let feeds_cfg = load_feeds(&cfg).context("loading feed config")?;
            let feeds = build_feeds(&feeds_cfg)?;
            let mut scanner = Scanner::new(profile, store).with_feeds(feeds, feeds_cfg.settings);
            let out = scanner.run_scan(Utc::now()).await?;
            println!("{}", out.report);
            println!("Report saved: {}", out.paths.report.display());
            println!("Data saved: {}", out.paths.data.display());
        }
        Command::Sample => {
            let mut scanner = Scanner::new(profile, store);
            let out = scanner.run_sample(Utc::now())?;
            println!("{}", out.report);
            println!("Report saved: {}", out.paths.report.display());
            println!("Data saved: {}", out.paths.data.display());
        }
        Command::Brief { rank } => {
            let mut scanner = Scanner::new(profile, store);
            if let Some(w) = writer(&cfg)? {
                scanner = scanner.with_writer(w);
            }
            let out = scanner.brief(rank, Utc::now()).await?;
            println!("{}", out.text);
            println!("\nBrief saved: {}", out.path.display());
        }
        Command::Check => {
            let summary = profile.summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
            let feeds_cfg = load_feeds(&cfg).context("loading feed config")?;
            let active: Vec<_> = feeds_cfg.active_feeds().collect();
            println!("Active feeds: {}", active.len());
            for f in active {
                println!("   - {} [{} | priority {}] {}", f.name, f.category, f.priority, f.url);
            }
            println!(
                "Brief writer: {}",
                if cfg.api_key.is_some() { "configured" } else { "not configured (manual prompts)" }
            );
        }
        Command::Serve(args) => {
            if let Some(h) = args.host {
                cfg.host = h.parse().with_context(|| format!("invalid --host {h:?}"))?;
            }
            if let Some(p) = args.port {
                cfg.port = p;
            }
            let addr = cfg.bind_addr();

            let metrics = Metrics::init()?;
            let mut state = AppState::new(profile);
            if let Some(w) = writer(&cfg)? {
                state = state.with_writer(w);
            }
            match store.load_latest() {
                Ok(Some(batch)) => state = state.with_last(batch),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = ?e, "could not load the latest saved run"),
            }

            let app = api::router(state, Some(&metrics));
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding {addr}"))?;
            tracing::info!(%addr, "listening");
            axum::serve(listener, app).await.context("http server")?;
        }
    }
    Ok(())
}
