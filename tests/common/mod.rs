//! Shared helpers for the WireMock integration tests.

#![allow(dead_code)]

use integrations_github_rest::{
    GitHubClient, GitHubConfig, Metrics, RestInvoker, TelemetrySink,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const TOKEN: &str = "ghp_integration";

/// Starts a mock API host.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Configuration pointing at the mock server with short retry delays.
pub fn test_config(server: &MockServer, max_retries: u32) -> GitHubConfig {
    GitHubConfig::builder()
        .api_host(server.uri())
        .max_retries(max_retries)
        .retry_delay(Duration::from_millis(10))
        .max_backoff(Duration::from_millis(100))
        .build()
        .expect("valid test config")
}

/// Invoker authenticated with [`TOKEN`] and reporting to `metrics`.
pub fn test_invoker(server: &MockServer, max_retries: u32, metrics: Arc<Metrics>) -> RestInvoker {
    RestInvoker::builder()
        .config(test_config(server, max_retries))
        .token(TOKEN)
        .telemetry(metrics as Arc<dyn TelemetrySink>)
        .build()
        .expect("invoker builds")
}

/// Command client authenticated with [`TOKEN`].
pub fn test_client(server: &MockServer) -> GitHubClient {
    GitHubClient::builder()
        .config(test_config(server, 1))
        .token(TOKEN)
        .build()
        .expect("client builds")
}

/// Mock requiring the test bearer token.
pub fn mock_with_auth(method_matcher: &str, path_matcher: &str) -> MockBuilder {
    Mock::given(method(method_matcher))
        .and(path(path_matcher))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
}

/// Success template with a JSON body.
pub fn success_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Error template in GitHub's error body format.
pub fn error_response(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    }))
}

/// `count` numbered items starting at `first`.
pub fn numbered_items(first: u64, count: u64) -> Value {
    Value::Array((first..first + count).map(|id| json!({"id": id})).collect())
}

/// `Link` header pointing at `page` of `path` on the mock server.
pub fn next_link(server: &MockServer, path: &str, page: u32) -> String {
    format!("<{}{}?per_page=100&page={}>; rel=\"next\"", server.uri(), path, page)
}
