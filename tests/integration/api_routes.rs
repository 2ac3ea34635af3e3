//! Integration tests for the versioned API routes

use super::test_utils::{drain, get, parse_matrix, post, router};
use rngr::api::ApiRequest;
use serde_json::json;

#[tokio::test]
async fn test_limits_endpoint() {
    let router = router();
    let response = get(&router, "/api/v1/limits").await;
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "application/json");
    let body = response.json_body().unwrap();
    assert_eq!(body, json!({"max_nodes": 1000, "max_batch_size": 100}));
}

#[tokio::test]
async fn test_validation_errors_are_400() {
    let router = router();
    for body in [
        json!({"nodes": 4, "bleh": 12}),
        json!({"nodes": 6, "type": "exact-degree-test", "node_degree": 3}),
        json!({"nodes": 12, "node_degree": 12, "connected": true}),
        json!({"type": "exact-degree", "nodes": 6, "node_degree": 3.5}),
        json!({"type": "exact-degree", "nodes": 6, "node_degree": 2, "weight_min": 4}),
        json!([1, 2, 3]),
    ] {
        let response = post(&router, "/api/v1/graph", body.clone()).await;
        assert_eq!(response.status, 400, "{}", body);
        assert_eq!(response.json_body().unwrap()["error"]["kind"], "validation");
    }
    assert!(router.service().jobs().is_empty());
}

#[tokio::test]
async fn test_infeasible_requests_are_400() {
    let router = router();
    for body in [
        json!({"type": "exact-degree", "nodes": 12, "node_degree": 12}),
        json!({"type": "exact-degree", "nodes": 11, "node_degree": 3}),
        json!({"type": "exact-degree", "nodes": 6, "node_degree": 0, "connected": true}),
        json!({"type": "average-degree", "nodes": 10, "node_degree_average": 12}),
        json!({"type": "between-degree", "nodes": 5, "node_degree": 2, "node_degree_max": 5}),
    ] {
        let response = post(&router, "/api/v1/graph", body.clone()).await;
        assert_eq!(response.status, 400, "{}", body);
        assert_eq!(response.json_body().unwrap()["error"]["kind"], "infeasible");
    }
}

#[tokio::test]
async fn test_node_limit_is_400() {
    let router = router();
    let response = post(
        &router,
        "/api/v1/graph",
        json!({"type": "exact-degree", "nodes": 1001, "node_degree": 2}),
    )
    .await;
    assert_eq!(response.status, 400);
    assert_eq!(response.json_body().unwrap()["error"]["kind"], "limit_exceeded");
}

#[tokio::test]
async fn test_download_formats() {
    let router = router();
    let response = post(
        &router,
        "/api/v1/graph",
        json!({
            "type": "exact-degree", "nodes": 6, "node_degree": 3, "connected": true,
            "weighted": true, "weight_min": 5, "weight_max": 9
        }),
    )
    .await;
    assert_eq!(response.status, 201);
    let id = response.json_body().unwrap()["id"].as_u64().unwrap();
    drain(&router).await;

    let matrix = get(&router, &format!("/api/v1/graph/{}/download", id)).await;
    assert_eq!(matrix.status, 200);
    assert_eq!(matrix.content_type, "text/plain");
    let rows = parse_matrix(&matrix.body_text());
    assert_eq!(rows.len(), 6);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row[i], 0);
        assert_eq!(row.iter().filter(|w| **w > 0).count(), 3);
        assert!(row.iter().all(|w| *w == 0 || (5..=9).contains(w)));
    }

    let edges = get(&router, &format!("/api/v1/graph/{}/download?graphKind=json", id)).await;
    let document = edges.json_body().unwrap();
    assert_eq!(document["nodes"], 6);
    assert_eq!(document["weighted"], true);
    assert_eq!(document["edges"].as_array().unwrap().len(), 9);

    let dot = get(&router, &format!("/api/v1/graph/{}/download?graphKind=DOT", id)).await;
    assert!(dot.body_text().starts_with("graph G {"));

    let fallback = get(&router, &format!("/api/v1/graph/{}/download?graphKind=svg", id)).await;
    assert_eq!(fallback.body, matrix.body);

    router.service().stop().await.unwrap();
}

#[tokio::test]
async fn test_unknown_job_is_404() {
    let router = router();
    for path in ["/api/v1/graph/999", "/api/v1/graph/999/download", "/api/v1/batch/7"] {
        let response = get(&router, path).await;
        assert_eq!(response.status, 404, "{}", path);
    }
}

#[tokio::test]
async fn test_unsupported_method_is_404() {
    let router = router();
    let response = router
        .handle(&ApiRequest::new("PATCH", "/api/v1/limits", None))
        .await;
    assert_eq!(response.status, 404);
}
