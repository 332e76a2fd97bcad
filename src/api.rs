use std::sync::{Arc, RwLock};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::analyze;
use crate::batch::{BatchResult, SelectError};
use crate::brief::{self, BriefWriter};
use crate::ingest::types::RawItem;
use crate::metrics::Metrics;
use crate::pipeline;
use crate::profile::{Profile, ProfileSummary};
use crate::record::ScoredRecord;
use crate::report::Summary;

pub const DEFAULT_RESULTS_LIMIT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    profile: Arc<Profile>,
    last: Arc<RwLock<Option<BatchResult>>>,
    writer: Option<Arc<dyn BriefWriter>>,
}

impl AppState {
    pub fn new(profile: Arc<Profile>) -> Self {
        Self {
            profile,
            last: Arc::new(RwLock::new(None)),
            writer: None,
        }
    }

    pub fn with_writer(mut self, writer: Arc<dyn BriefWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Seed the last batch (e.g. from a saved run).
    pub fn with_last(self, batch: BatchResult) -> Self {
        self.set_last(batch);
        self
    }

    fn set_last(&self, batch: BatchResult) {
        // A poisoned lock still holds a complete value; writes replace it whole.
        let mut g = self.last.write().unwrap_or_else(|e| e.into_inner());
        *g = Some(batch);
    }

    /// Look up a 1-based rank taken verbatim from the URL. Anything that is not a
    /// positive integer is out of range, like rank 0.
    fn select(&self, raw_rank: &str) -> Result<(usize, ScoredRecord), SelectError> {
        let g = self.last.read().unwrap_or_else(|e| e.into_inner());
        let batch = g.as_ref().ok_or(SelectError::Empty)?;
        let rank = raw_rank.trim().parse::<usize>().unwrap_or(0);
        let record = batch.select(rank)?.clone();
        Ok((rank, record))
    }
}

pub fn router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let api = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/profile", get(profile_summary))
        .route("/score", post(score_one))
        .route("/batch", post(score_many))
        .route("/results", get(results))
        .route("/results/{rank}", get(result_at))
        .route("/results/{rank}/brief", post(brief_at))
        .with_state(state);

    let app = match metrics {
        Some(m) => api.merge(m.router()),
        None => api,
    };
    app.layer(CorsLayer::very_permissive())
}

struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<SelectError> for ApiError {
    fn from(e: SelectError) -> Self {
        ApiError(StatusCode::NOT_FOUND, e.to_string())
    }
}

async fn profile_summary(State(state): State<AppState>) -> Json<ProfileSummary> {
    Json(state.profile.summary())
}

async fn score_one(State(state): State<AppState>, Json(mut item): Json<RawItem>) -> Json<ScoredRecord> {
    item.ensure_id();
    Json(analyze::score(&item, &state.profile))
}

#[derive(Serialize)]
struct BatchResp {
    summary: Summary,
    items: Vec<ScoredRecord>,
}

async fn score_many(State(state): State<AppState>, Json(items): Json<Vec<RawItem>>) -> Json<BatchResp> {
    let items = items
        .into_iter()
        .map(|mut it| {
            it.ensure_id();
            it
        })
        .collect::<Vec<_>>();
    let batch = pipeline::score_items(&items, &state.profile);
    let resp = BatchResp {
        summary: Summary::from_records(&batch),
        items: batch.records().to_vec(),
    };
    state.set_last(batch);
    Json(resp)
}

#[derive(Deserialize)]
struct ResultsQuery {
    limit: Option<usize>,
}

async fn results(
    State(state): State<AppState>,
    Query(q): Query<ResultsQuery>,
) -> Result<Json<Vec<ScoredRecord>>, ApiError> {
    let limit = q.limit.unwrap_or(DEFAULT_RESULTS_LIMIT);
    let g = state.last.read().unwrap_or_else(|e| e.into_inner());
    let batch = g.as_ref().ok_or(SelectError::Empty)?;
    Ok(Json(batch.iter().take(limit).cloned().collect()))
}

async fn result_at(
    State(state): State<AppState>,
    Path(rank): Path<String>,
) -> Result<Json<ScoredRecord>, ApiError> {
    let (_, record) = state.select(&rank)?;
    Ok(Json(record))
}

#[derive(Serialize)]
struct BriefResp {
    rank: usize,
    id: String,
    brief: String,
}

async fn brief_at(
    State(state): State<AppState>,
    Path(rank): Path<String>,
) -> Result<Json<BriefResp>, ApiError> {
    let (rank, record) = state.select(&rank)?;
    let text = brief::generate_brief(state.writer.as_deref(), &state.profile, &record).await;
    Ok(Json(BriefResp {
        rank,
        id: record.item.id,
        brief: text,
    }))
}
