//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p transfer-api`.

pub mod fixtures;
pub mod mail;

use axum_test::{TestRequest, TestServer};
use std::sync::Arc;
use tempfile::TempDir;
use transfer_api::constants;
use transfer_api::setup::{build_state, routes};
use transfer_core::{Config, PortalConfig};

use mail::RecordingTransport;

pub const TEST_ACCESS_KEY: &str = "Lab-Alpha";
pub const FACILITY_EMAIL: &str = "ccm@example.org";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, the mock mail transport and the output directory.
pub struct TestApp {
    pub server: TestServer,
    pub transport: Arc<RecordingTransport>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn get(&self, path: &str, cookie: &str) -> TestRequest {
        self.authorized(self.server.get(&api_path(path)), cookie)
    }

    pub fn post(&self, path: &str, cookie: &str) -> TestRequest {
        self.authorized(self.server.post(&api_path(path)), cookie)
    }

    pub fn patch(&self, path: &str, cookie: &str) -> TestRequest {
        self.authorized(self.server.patch(&api_path(path)), cookie)
    }

    pub fn delete(&self, path: &str, cookie: &str) -> TestRequest {
        self.authorized(self.server.delete(&api_path(path)), cookie)
    }

    fn authorized(&self, request: TestRequest, cookie: &str) -> TestRequest {
        let request = request.add_header(constants::ACCESS_KEY_HEADER, TEST_ACCESS_KEY);
        if cookie.is_empty() {
            request
        } else {
            request.add_header("cookie", cookie.to_string())
        }
    }

    /// Start a session and return the `Cookie` header value for it.
    pub async fn start_session(&self) -> String {
        let response = self.post("/sessions", "").await;
        assert_eq!(response.status_code(), 201);
        let set_cookie = response.header("set-cookie");
        let set_cookie = set_cookie.to_str().expect("set-cookie is ascii");
        set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .to_string()
    }
}

pub fn test_config(output_dir: &std::path::Path) -> Config {
    let output_dir = output_dir.to_string_lossy().into_owned();
    let pairs = [
        ("SENDER_EMAIL", "portal@example.org".to_string()),
        ("APP_PASSWORD", "secret".to_string()),
        ("FACILITY_EMAIL", FACILITY_EMAIL.to_string()),
        ("ACCESS_KEYS", "lab-alpha, lab-beta".to_string()),
        ("OUTPUT_DIR", output_dir),
        ("MAX_UPLOAD_SIZE_MB", "2".to_string()),
    ];
    let portal = PortalConfig::from_lookup(|key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    })
    .expect("Failed to build test config");
    Config(Box::new(portal))
}

/// Setup test app with a transport that always succeeds.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(RecordingTransport::default()).await
}

pub async fn setup_test_app_with(transport: RecordingTransport) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(temp_dir.path());
    let transport = Arc::new(transport);

    let state = build_state(config, transport.clone())
        .await
        .expect("Failed to build app state");
    let app = routes::setup_routes(&state.config, state.clone());
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        transport,
        temp_dir,
    }
}
