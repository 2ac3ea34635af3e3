//! Integration tests for job status progression

use super::test_utils::{drain, get, post, router, router_with};
use rngr::config::RngrConfig;
use rngr::jobs::{JobId, JobStatus};
use rngr::service::PollConfig;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_job_moves_from_queued_to_finished() {
    let router = router();
    let response = post(
        &router,
        "/api/v1/graph",
        json!({"type": "average-degree", "nodes": 25, "node_degree_average": 6.8, "seed": 123442233}),
    )
    .await;
    let job = response.json_body().unwrap();
    assert_eq!(job["status"], "queued");
    assert_eq!(job["seed"], 123442233);
    let id = JobId::from(job["id"].as_u64().unwrap());

    let service = router.service();
    service.start().unwrap();
    let finished = service
        .poll_until_terminal(id, PollConfig::default())
        .await
        .unwrap();
    assert_eq!(finished.status, JobStatus::Finished);
    assert!(finished.started_at.is_some());
    assert!(finished.finished_at >= finished.started_at);

    let response = get(&router, &format!("/api/v1/graph/{}", id)).await;
    let body = response.json_body().unwrap();
    assert_eq!(body["status"], "finished");
    assert_eq!(body["type"], "average-degree");
    assert_eq!(body["node_degree_average"], 6.8);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_drawn_seed_is_reported() {
    let router = router();
    let job = post(
        &router,
        "/api/v1/graph",
        json!({"type": "exact-degree", "nodes": 4, "node_degree": 2}),
    )
    .await
    .json_body()
    .unwrap();
    let seed = job["seed"].as_i64().unwrap();
    assert!((0..1i64 << 53).contains(&seed));
}

#[tokio::test]
async fn test_jobs_listed_in_id_order() {
    let router = router();
    for nodes in [4, 5, 6] {
        post(
            &router,
            "/api/v1/graph",
            json!({"type": "exact-degree", "nodes": nodes, "node_degree": 2}),
        )
        .await;
    }
    drain(&router).await;

    let listing = get(&router, "/api/v1/graph").await.json_body().unwrap();
    let graphs = listing["graphs"].as_array().unwrap();
    let ids: Vec<u64> = graphs.iter().map(|g| g["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(graphs.iter().all(|g| g["status"] == "finished"));

    let stats = router.service().stats();
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.finished, 3);
    router.service().stop().await.unwrap();
}

#[tokio::test]
async fn test_queue_full_is_503() {
    let mut config = RngrConfig::default();
    config.scheduler.max_queue_size = 1;
    let router = router_with(config);
    let body = json!({"type": "exact-degree", "nodes": 4, "node_degree": 2});

    assert_eq!(post(&router, "/api/v1/graph", body.clone()).await.status, 201);
    let response = post(&router, "/api/v1/graph", body).await;
    assert_eq!(response.status, 503);
    assert_eq!(response.json_body().unwrap()["error"]["kind"], "queue_full");
}

#[tokio::test]
async fn test_poll_times_out_without_workers() {
    let router = router();
    let job = router
        .service()
        .submit(&json!({"type": "exact-degree", "nodes": 4, "node_degree": 2}))
        .await
        .unwrap();
    let poll = PollConfig {
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        timeout: Some(Duration::from_millis(20)),
    };
    let err = router
        .service()
        .poll_until_terminal(job.id, poll)
        .await
        .unwrap_err();
    assert_eq!(err.status(), 504);
}
