use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use blackhole::ai::{AiConfigHandle, AiError, Analyzer, Provider};
use blackhole::config::ServerConfig;
use blackhole::models::AiAnalysis;
use blackhole::server::build_router;
use blackhole::state::AppState;
use blackhole::store::Store;

/// Analyzer that answers without any network access
pub struct StubAnalyzer {
    pub suggested_name: Option<String>,
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(&self, _path: &Path, _model: Option<&str>) -> Result<AiAnalysis, AiError> {
        match &self.suggested_name {
            Some(name) => Ok(AiAnalysis {
                suggested_name: name.clone(),
                category: "document".to_string(),
                confidence: 0.8,
            }),
            None => Err(AiError::Timeout {
                provider: Provider::Ollama,
            }),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestApp {
    pub fn destination(&self) -> PathBuf {
        self.state.config.default_destination.clone()
    }

    /// Write a file into the scratch inbox
    pub fn drop_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let inbox = self.dir.path().join("inbox");
        std::fs::create_dir_all(&inbox).unwrap();
        let path = inbox.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

/// Router over an in-memory store with a scratch default destination.
pub fn build_test_app(suggested_name: Option<&str>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig {
        port: 0,
        db_path: dir.path().join("unused.db"),
        default_destination: dir.path().join("BlackHole"),
        ..ServerConfig::default()
    };
    let store = Arc::new(Store::open_in_memory().unwrap());
    let analyzer = Arc::new(StubAnalyzer {
        suggested_name: suggested_name.map(str::to_string),
    });

    let (state, _rx) = AppState::new(config, store, AiConfigHandle::default(), analyzer);
    TestApp {
        router: build_router(state.clone()),
        state,
        dir,
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response.into_body()).await)
}

pub async fn get(app: &Router, uri: &str) -> Value {
    let (status, body) = send(app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

pub async fn post(app: &Router, uri: &str, body: Value) -> Value {
    let (status, body) = send(app, Method::POST, uri, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    body
}

pub async fn body_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
