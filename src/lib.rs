// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod batch;
pub mod brief;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod profile;
pub mod record;
pub mod report;

// ---- Re-exports for stable public API ----
pub use crate::analyze::score;
pub use crate::api::router;
pub use crate::batch::{score_batch, BatchResult, SelectError};
pub use crate::ingest::types::RawItem;
pub use crate::profile::Profile;
pub use crate::record::{Flag, HookKind, ScoredRecord, Status};
