//! Common test utilities: an in-process router wired to the in-memory store
//! and a mock evaluator, so the API can be exercised without Redis or an
//! external evaluator.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use matchgrid_core::{
    create_deleter, load_config_from_str, testing::FirstComeEvaluator,
    testing::MemoryStateStore, BackendService, FrontendService, MatchFunctionHost,
    MmfHostConfig, PairMatchFunction, QueryConfig, QueryService, Synchronizer,
    SynchronizerConfig,
};

/// Re-export fixtures for test convenience
pub use matchgrid_core::testing::fixtures;

/// In-process server with mock dependencies injected.
pub struct TestFixture {
    pub router: Router,
    pub store: Arc<MemoryStateStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    pub fn new() -> Self {
        let config = load_config_from_str(
            r#"
[evaluator]
ws_port = 50508
"#,
        )
        .expect("test config must parse");

        let store = Arc::new(MemoryStateStore::new());

        let (deleter_handle, deleter) = create_deleter(store.clone(), 32);
        tokio::spawn(deleter.run());

        let query = Arc::new(QueryService::new(store.clone(), QueryConfig::default()));
        let host = Arc::new(MatchFunctionHost::new(
            Arc::clone(&query),
            MmfHostConfig::default(),
        ));
        let synchronizer = Arc::new(Synchronizer::new(
            store.clone(),
            Arc::new(FirstComeEvaluator::new()),
            SynchronizerConfig {
                registration_interval_ms: 30,
                proposal_collection_interval_ms: 1_000,
            },
        ));
        let frontend = FrontendService::new(store.clone(), deleter_handle);
        let backend =
            BackendService::new(host, Arc::clone(&synchronizer), store.clone())
                .with_function(Arc::new(PairMatchFunction::new()));

        let state = Arc::new(matchgrid_server::AppState::new(
            config,
            store.clone(),
            frontend,
            backend,
            query,
            synchronizer,
        ));

        Self {
            router: matchgrid_server::create_router(state),
            store,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::get(path).body(Body::empty()).expect("request"))
            .await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(
            Request::delete(path)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.send(
            Request::post(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body read failed")
            .to_bytes();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }
}
