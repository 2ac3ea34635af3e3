//! Integration tests for batch submission

use super::test_utils::{drain, get, parse_matrix, post, router};
use serde_json::json;
use std::io::{Cursor, Read};

#[tokio::test]
async fn test_mixed_batch_accepts_valid_items() {
    let router = router();
    let response = post(
        &router,
        "/api/v1/batch",
        json!([
            {"type": "exact-degree", "nodes": 8, "node_degree": 3},
            {"type": "exact-degree", "nodes": 11, "node_degree": 3},
            {"nodes": 4, "bleh": 12},
            {"type": "average-degree", "nodes": 10, "node_degree_average": 2}
        ]),
    )
    .await;
    assert_eq!(response.status, 201);
    let batch = response.json_body().unwrap();
    assert_eq!(batch["accepted"], 2);
    assert_eq!(batch["rejected"], 2);

    let items = batch["items"].as_array().unwrap();
    assert_eq!(items[0]["status"], "accepted");
    assert_eq!(items[1]["status"], "rejected");
    assert_eq!(items[1]["error"]["kind"], "infeasible");
    assert_eq!(items[2]["error"]["kind"], "validation");
    assert_eq!(items[3]["index"], 3);

    drain(&router).await;
    let id = batch["id"].as_u64().unwrap();
    let view = get(&router, &format!("/api/v1/batch/{}", id)).await.json_body().unwrap();
    assert_eq!(view["status"], "finished");

    let job_id = items[0]["job_id"].as_u64().unwrap();
    let job = get(&router, &format!("/api/v1/graph/{}", job_id)).await.json_body().unwrap();
    assert_eq!(job["batch_id"], id);
    router.service().stop().await.unwrap();
}

#[tokio::test]
async fn test_numbered_batch() {
    let router = router();
    let response = post(
        &router,
        "/api/v1/batch",
        json!({"number": 3, "base": {"type": "exact-degree", "nodes": 6, "node_degree": 2}}),
    )
    .await;
    let batch = response.json_body().unwrap();
    assert_eq!(batch["accepted"], 3);
    assert_eq!(batch["status"], "queued");

    let listing = get(&router, "/api/v1/batch").await.json_body().unwrap();
    assert_eq!(listing["batches"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_oversized_and_empty_batches_rejected() {
    let router = router();
    let response = post(
        &router,
        "/api/v1/batch",
        json!({"number": 101, "base": {"type": "exact-degree", "nodes": 6, "node_degree": 2}}),
    )
    .await;
    assert_eq!(response.status, 400);

    let response = post(&router, "/api/v1/batch", json!([])).await;
    assert_eq!(response.status, 400);
    assert!(router.service().jobs().is_empty());
}

#[tokio::test]
async fn test_batch_download_archive() {
    let router = router();
    let response = post(
        &router,
        "/api/v1/batch",
        json!([
            {"type": "exact-degree", "nodes": 6, "node_degree": 2, "seed": 7},
            {"type": "exact-degree", "nodes": 7, "node_degree": 3},
            {"type": "between-degree", "nodes": 9, "node_degree": 1, "node_degree_max": 4, "seed": 8}
        ]),
    )
    .await;
    let batch = response.json_body().unwrap();
    let id = batch["id"].as_u64().unwrap();
    let items = batch["items"].as_array().unwrap();
    let first = items[0]["job_id"].as_u64().unwrap();
    let last = items[2]["job_id"].as_u64().unwrap();

    let pending = get(&router, &format!("/api/v1/batch/{}/download", id)).await;
    assert_eq!(pending.status, 409);
    assert_eq!(pending.json_body().unwrap()["error"]["kind"], "not_ready");

    let missing = get(&router, "/api/v1/batch/999/download").await;
    assert_eq!(missing.status, 404);

    drain(&router).await;
    let response = get(&router, &format!("/api/v1/batch/{}/download", id)).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "application/zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(response.body)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![format!("rngr-{}.txt", first), format!("rngr-{}.txt", last)]
    );

    let mut matrix = String::new();
    archive
        .by_name(&format!("rngr-{}.txt", first))
        .unwrap()
        .read_to_string(&mut matrix)
        .unwrap();
    let single = get(&router, &format!("/api/v1/graph/{}/download", first)).await;
    assert_eq!(matrix, single.body_text());
    assert_eq!(parse_matrix(&matrix).len(), 6);

    let dot = get(&router, &format!("/api/v1/batch/{}/download?graphKind=dot", id)).await;
    let archive = zip::ZipArchive::new(Cursor::new(dot.body)).unwrap();
    assert!(archive.file_names().all(|name| name.ends_with(".dot")));

    router.service().stop().await.unwrap();
}
