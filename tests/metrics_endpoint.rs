// tests/metrics_endpoint.rs
//
// The Prometheus recorder is process-global, so this binary installs it once
// and keeps everything in a single test.

use std::sync::Arc;

use axum::body::{self, Body};
use http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use content_intel::api::{self, AppState};
use content_intel::metrics::Metrics;
use content_intel::Profile;

#[tokio::test]
async fn metrics_endpoint_exposes_scoring_counters() {
    let metrics = Metrics::init().expect("install recorder");
    let profile = Profile::from_json_str(r#"{"negative_keywords":["NFL"]}"#).unwrap();
    let app = api::router(AppState::new(Arc::new(profile)), Some(&metrics));

    let payload = json!([
        { "title": "NFL preview" },
        { "title": "Gold hits record" },
        { "title": "GOLD HITS RECORD" }
    ]);
    let req = Request::post("/batch")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("scoring_items_total 3"), "{text}");
    assert!(text.contains("scoring_rejected_total 1"), "{text}");
    assert!(text.contains("batch_duplicates_total 1"), "{text}");
    // a second recorder cannot be installed
    assert!(Metrics::init().is_err());
}
