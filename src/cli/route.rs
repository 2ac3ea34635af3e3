//! CLI route: single route table and run context.

use crate::api::{ApiRequest, Router};
use crate::cli::parse::Commands;
use crate::config::{ConfigLoader, RngrConfig};
use crate::error::{ApiError, SpecError};
use crate::jobs::{BatchItem, JobStatus};
use crate::render::GraphFormat;
use crate::service::{GraphService, PollConfig};
use futures::future::join_all;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{info, warn};

/// Runtime context for CLI execution: configuration, the service and its runtime.
pub struct RunContext {
    config: RngrConfig,
    router: Router,
    runtime: Runtime,
}

impl RunContext {
    /// Load configuration and build the service. Uses ConfigLoader only.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Self::from_config(config)
    }

    pub fn from_config(config: RngrConfig) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to start runtime: {}", e)))?;
        let service = Arc::new(GraphService::new(&config));
        Ok(Self {
            config,
            router: Router::new(service),
            runtime,
        })
    }

    pub fn config(&self) -> &RngrConfig {
        &self.config
    }

    fn service(&self) -> &Arc<GraphService> {
        self.router.service()
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Limits => to_pretty(&self.service().limits()),
            Commands::Generate { spec, graph_kind } => {
                let raw = read_json_arg(spec)?;
                self.runtime.block_on(self.generate(&raw, graph_kind))
            }
            Commands::Batch {
                specs,
                archive,
                graph_kind,
            } => {
                let raw = read_json_arg(specs)?;
                let format = GraphFormat::parse(Some(graph_kind));
                self.runtime
                    .block_on(self.batch(&raw, archive.as_deref(), format))
            }
            Commands::Request { method, path, body } => {
                let request = ApiRequest::new(method, path, body.clone());
                let response = self.runtime.block_on(self.router.handle(&request));
                let body = if response.is_text() {
                    response.body_text().into_owned()
                } else {
                    format!("<{} bytes>", response.body.len())
                };
                Ok(format!("{} {}\n{}", response.status, response.content_type, body))
            }
        }
    }

    async fn generate(&self, raw: &Value, graph_kind: &str) -> Result<String, ApiError> {
        let service = self.service();
        let job = service.submit(raw).await?;
        service.start()?;
        let job = service.poll_until_terminal(job.id, PollConfig::default()).await;
        service.stop().await?;
        let job = job?;

        if let Some(error) = &job.error {
            warn!(job_id = %job.id, kind = %error.kind, message = %error.message, "Generation failed");
        }
        info!(job_id = %job.id, seed = job.seed, status = %job.status, "Generation finished");
        service.download(job.id, GraphFormat::parse(Some(graph_kind)))
    }

    async fn batch(
        &self,
        raw: &Value,
        archive: Option<&Path>,
        format: GraphFormat,
    ) -> Result<String, ApiError> {
        let service = self.service();
        let batch = service.submit_batch(raw).await?;
        service.start()?;

        let waits = batch
            .items
            .iter()
            .filter_map(BatchItem::job_id)
            .map(|id| service.poll_until_terminal(id, PollConfig::default()));
        let outcomes = join_all(waits).await;
        service.stop().await?;

        let errored = outcomes
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?
            .iter()
            .filter(|job| job.status == JobStatus::Errored)
            .count();
        info!(batch_id = %batch.id, errored, "Batch finished");

        if let Some(path) = archive {
            let bytes = service.download_batch(batch.id, format)?;
            std::fs::write(path, &bytes).map_err(|e| {
                ApiError::Archive(format!("cannot write {}: {}", path.display(), e))
            })?;
            info!(batch_id = %batch.id, path = %path.display(), "Batch archive written");
        }

        to_pretty(&service.batch(batch.id)?)
    }
}

/// Inline JSON, or `@path` naming a file that holds it
fn read_json_arg(arg: &str) -> Result<Value, ApiError> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| SpecError::MalformedBody(format!("cannot read {}: {}", path, e)))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| SpecError::MalformedBody(e.to_string()).into())
}

fn to_pretty<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render output: {}", e)))
}
