//! Shared helpers for integration tests

use rngr::api::{ApiRequest, ApiResponse, Router};
use rngr::config::RngrConfig;
use rngr::service::GraphService;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A router over a fresh service with default configuration
pub fn router() -> Router {
    router_with(RngrConfig::default())
}

pub fn router_with(config: RngrConfig) -> Router {
    Router::new(Arc::new(GraphService::new(&config)))
}

pub async fn post(router: &Router, path: &str, body: Value) -> ApiResponse {
    router.handle(&ApiRequest::post(path, body.to_string())).await
}

pub async fn get(router: &Router, path: &str) -> ApiResponse {
    router.handle(&ApiRequest::get(path)).await
}

/// Start the workers and wait until every queued job has run
pub async fn drain(router: &Router) {
    let service = router.service();
    service.start().unwrap();
    service
        .wait_for_idle(Some(Duration::from_secs(30)))
        .await
        .unwrap();
}

/// Parse a newline-terminated adjacency matrix
pub fn parse_matrix(text: &str) -> Vec<Vec<u32>> {
    text.lines()
        .map(|row| row.split(' ').map(|cell| cell.parse().unwrap()).collect())
        .collect()
}
