//! Integration tests for Configuration System

use rngr::config::{ConfigLoader, RngrConfig};
use rngr::service::GraphService;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_config_file_limits_reach_the_service() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("rngr.toml");
    std::fs::write(
        &config_file,
        r#"
[limits]
max_nodes = 50
max_batch_size = 4

[scheduler]
workers = 2

[generation]
weight_min = 10
weight_max = 20

[logging]
level = "warn"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert_eq!(config.limits.max_nodes, 50);
    assert_eq!(config.scheduler.workers, 2);
    assert_eq!(config.scheduler.max_queue_size, RngrConfig::default().scheduler.max_queue_size);
    assert_eq!(config.logging.level, "warn");

    let service = GraphService::new(&config);
    assert_eq!(service.limits().max_batch_size, 4);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let err = service
            .submit(&json!({"type": "exact-degree", "nodes": 51, "node_degree": 2}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.kind(), "limit_exceeded");

        let job = service
            .submit(&json!({"type": "exact-degree", "nodes": 6, "node_degree": 2, "weighted": true}))
            .await
            .unwrap();
        assert_eq!(job.spec.weight_min, Some(10));
        assert_eq!(job.spec.weight_max, Some(20));
    });
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("rngr.toml");
    std::fs::write(&config_file, "[scheduler]\nworkers = 0\n").unwrap();

    let err = ConfigLoader::load_from_file(&config_file).unwrap_err();
    assert!(err.to_string().contains("Scheduler"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}
