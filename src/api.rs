//! HTTP surface
//!
//! The versioned API expressed as a pure dispatch over a transport-neutral request and
//! response pair. Any HTTP server can adapt to it by filling an [`ApiRequest`] and
//! writing back the [`ApiResponse`].
//!
//! | Method | Path                               | Success |
//! |--------|------------------------------------|---------|
//! | GET    | `/api/v1/limits`                   | 200     |
//! | GET    | `/api/v1/graph`                    | 200     |
//! | POST   | `/api/v1/graph`                    | 201     |
//! | GET    | `/api/v1/graph/{id}`               | 200     |
//! | GET    | `/api/v1/graph/{id}/download`      | 200     |
//! | GET    | `/api/v1/batch`                    | 200     |
//! | POST   | `/api/v1/batch`                    | 201     |
//! | GET    | `/api/v1/batch/{id}`               | 200     |
//! | GET    | `/api/v1/batch/{id}/download`      | 200     |
//!
//! Everything else, including other methods on these paths, answers 404.

use crate::error::{ApiError, SpecError};
use crate::jobs::{BatchId, JobId};
use crate::render::GraphFormat;
use crate::service::GraphService;
use serde::Serialize;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const API_PREFIX: &str = "/api/v1/";
const JSON: &str = "application/json";
const ZIP: &str = "application/zip";

/// Incoming request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    /// Build a request from a method and a target such as `/api/v1/graph/3/download?graphKind=dot`
    pub fn new(method: &str, target: &str, body: Option<String>) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, BTreeMap::new()),
        };
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            query,
            body,
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new("GET", target, None)
    }

    pub fn post(target: &str, body: impl Into<String>) -> Self {
        Self::new("POST", target, Some(body.into()))
    }
}

fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Outgoing response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                content_type: JSON,
                body: body.into_bytes(),
            },
            Err(e) => Self {
                status: 500,
                content_type: JSON,
                body: json!({"error": {"kind": "serialization", "message": e.to_string()}})
                    .to_string()
                    .into_bytes(),
            },
        }
    }

    fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    /// `{"error": {"kind", "message"}}` with the error's status
    pub fn error(err: &ApiError) -> Self {
        Self::json(err.status(), &json!({ "error": err.detail() }))
    }

    /// Parse the body as JSON
    pub fn json_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Everything except archives is UTF-8 text
    pub fn is_text(&self) -> bool {
        self.content_type != ZIP
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Request router over a [`GraphService`]
pub struct Router {
    service: Arc<GraphService>,
}

impl Router {
    pub fn new(service: Arc<GraphService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<GraphService> {
        &self.service
    }

    /// Dispatch a request. Never fails: errors become error responses.
    pub async fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let response = match self.dispatch(request).await {
            Ok(response) => response,
            Err(err) => ApiResponse::error(&err),
        };
        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            "Handled request"
        );
        response
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let not_found = || ApiError::RouteNotFound(format!("{} {}", request.method, request.path));
        let segments: Vec<&str> = request
            .path
            .strip_prefix(API_PREFIX)
            .ok_or_else(not_found)?
            .split('/')
            .collect();

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["limits"]) => Ok(ApiResponse::json(200, &self.service.limits())),

            ("GET", ["graph"]) => Ok(ApiResponse::json(
                200,
                &json!({ "graphs": self.service.jobs() }),
            )),
            ("POST", ["graph"]) => {
                let body = parse_body(request)?;
                let job = self.service.submit(&body).await?;
                Ok(ApiResponse::json(201, &job))
            }
            ("GET", ["graph", id]) => {
                let id = JobId::parse(id).ok_or_else(not_found)?;
                Ok(ApiResponse::json(200, &self.service.job(id)?))
            }
            ("GET", ["graph", id, "download"]) => {
                let id = JobId::parse(id).ok_or_else(not_found)?;
                let format = GraphFormat::parse(request.query.get("graphKind").map(String::as_str));
                let text = self.service.download(id, format)?;
                Ok(ApiResponse::ok(format.content_type(), text.into_bytes()))
            }

            ("GET", ["batch"]) => Ok(ApiResponse::json(
                200,
                &json!({ "batches": self.service.batches() }),
            )),
            ("POST", ["batch"]) => {
                let body = parse_body(request)?;
                let batch = self.service.submit_batch(&body).await?;
                Ok(ApiResponse::json(201, &batch))
            }
            ("GET", ["batch", id]) => {
                let id = BatchId::parse(id).ok_or_else(not_found)?;
                Ok(ApiResponse::json(200, &self.service.batch(id)?))
            }
            ("GET", ["batch", id, "download"]) => {
                let id = BatchId::parse(id).ok_or_else(not_found)?;
                let format = GraphFormat::parse(request.query.get("graphKind").map(String::as_str));
                Ok(ApiResponse::ok(ZIP, self.service.download_batch(id, format)?))
            }

            _ => Err(not_found()),
        }
    }
}

fn parse_body(request: &ApiRequest) -> Result<Value, ApiError> {
    let body = request
        .body
        .as_deref()
        .filter(|body| !body.trim().is_empty())
        .ok_or_else(|| SpecError::MalformedBody("request body is empty".to_string()))?;
    serde_json::from_str(body).map_err(|e| SpecError::MalformedBody(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RngrConfig;

    fn router() -> Router {
        Router::new(Arc::new(GraphService::new(&RngrConfig::default())))
    }

    #[test]
    fn test_request_target_parsing() {
        let request = ApiRequest::new("get", "/api/v1/graph/3/download?graphKind=dot&x", None);
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/api/v1/graph/3/download");
        assert_eq!(request.query.get("graphKind").map(String::as_str), Some("dot"));
        assert_eq!(request.query.get("x").map(String::as_str), Some(""));
    }

    #[tokio::test]
    async fn test_limits_route() {
        let response = router().handle(&ApiRequest::get("/api/v1/limits")).await;
        assert_eq!(response.status, 200);
        let body = response.json_body().unwrap();
        assert_eq!(body["max_nodes"], 1000);
        assert_eq!(body["max_batch_size"], 100);
    }

    #[tokio::test]
    async fn test_unknown_paths_and_methods() {
        let router = router();
        for request in [
            ApiRequest::get("/api/"),
            ApiRequest::get("/api/v1"),
            ApiRequest::get("/api/v1/"),
            ApiRequest::get("/api/v2/limits"),
            ApiRequest::get("/api/v1/graph/abc"),
            ApiRequest::get("/api/v1/graph/+1"),
            ApiRequest::get("/api/v1/batch/+1/download"),
            ApiRequest::get("/api/v1/graph/1/2/3"),
            ApiRequest::new("DELETE", "/api/v1/graph/1", None),
            ApiRequest::new("PUT", "/api/v1/graph", Some("{}".to_string())),
            ApiRequest::post("/api/v1/limits", "{}"),
        ] {
            let response = router.handle(&request).await;
            assert_eq!(response.status, 404, "{} {}", request.method, request.path);
            assert_eq!(response.json_body().unwrap()["error"]["kind"], "not_found");
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let router = router();
        let response = router.handle(&ApiRequest::post("/api/v1/graph", "{nope")).await;
        assert_eq!(response.status, 400);
        assert_eq!(response.json_body().unwrap()["error"]["kind"], "validation");

        let response = router
            .handle(&ApiRequest::new("POST", "/api/v1/graph", None))
            .await;
        assert_eq!(response.status, 400);
    }

    #[tokio::test]
    async fn test_submit_then_get() {
        let router = router();
        let response = router
            .handle(&ApiRequest::post(
                "/api/v1/graph",
                r#"{"type": "exact-degree", "nodes": 8, "node_degree": 3, "connected": true}"#,
            ))
            .await;
        assert_eq!(response.status, 201);
        let job = response.json_body().unwrap();
        assert_eq!(job["status"], "queued");
        assert!(job["seed"].is_i64());

        let id = job["id"].as_u64().unwrap();
        let response = router
            .handle(&ApiRequest::get(&format!("/api/v1/graph/{}", id)))
            .await;
        assert_eq!(response.status, 200);
        assert_eq!(response.json_body().unwrap()["id"], id);

        let response = router
            .handle(&ApiRequest::get(&format!("/api/v1/graph/+{}", id)))
            .await;
        assert_eq!(response.status, 404);

        let response = router
            .handle(&ApiRequest::get(&format!("/api/v1/graph/{}/download", id)))
            .await;
        assert_eq!(response.status, 409);
    }
}
