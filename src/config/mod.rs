// src/config/mod.rs
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::brief::{DEFAULT_MODEL, ENV_API_KEY, ENV_MODEL};
use crate::ingest::config::ENV_PATH as ENV_FEEDS_PATH;
use crate::profile::ENV_CHANNEL_DNA_PATH;

pub const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_PORT: u16 = 8080;

/// Process settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Explicit profile path; `None` → loader fallbacks.
    pub dna_path: Option<PathBuf>,
    /// Explicit feeds path; `None` → loader fallbacks.
    pub feeds_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub api_key: Option<String>,
    pub brief_model: String,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dna_path: None,
            feeds_path: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            api_key: None,
            brief_model: DEFAULT_MODEL.to_string(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        let host = match non_empty("HOST") {
            Some(h) => h.parse().with_context(|| format!("invalid HOST {h:?}"))?,
            None => d.host,
        };
        let port = match non_empty("PORT") {
            Some(p) => p.parse().with_context(|| format!("invalid PORT {p:?}"))?,
            None => d.port,
        };
        Ok(Self {
            dna_path: non_empty(ENV_CHANNEL_DNA_PATH).map(PathBuf::from),
            feeds_path: non_empty(ENV_FEEDS_PATH).map(PathBuf::from),
            output_dir: non_empty(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or(d.output_dir),
            api_key: non_empty(ENV_API_KEY),
            brief_model: non_empty(ENV_MODEL).unwrap_or(d.brief_model),
            host,
            port,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
