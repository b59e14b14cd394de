//! Test helper utilities for integration tests

use gateway_config::GatewayConfig;
use gateway_server::AppState;
use once_cell::sync::Lazy;
use reqwest::Response;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for tests (only once)
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
});

/// Initialize tracing for tests
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// A gateway listening on an ephemeral loopback port
pub struct TestServer {
    /// The server address
    pub addr: SocketAddr,
    /// Base URL for the server
    pub base_url: String,
    http: reqwest::Client,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a gateway with `config`
    pub async fn start(config: GatewayConfig) -> Self {
        let state = AppState::builder()
            .config(config)
            .build()
            .expect("Failed to build state");

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            gateway_server::serve(listener, state, async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
        });

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create client");

        Self {
            addr,
            base_url: format!("http://{addr}"),
            http,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the full URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// SDK client pointed at this gateway
    pub fn sdk(&self) -> gateway_sdk::Client {
        gateway_sdk::Client::builder()
            .base_url(&self.base_url)
            .build()
            .expect("Failed to create SDK client")
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Response {
        self.http
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    /// Make a POST request with a JSON body
    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    /// Parse a response body as JSON
    pub async fn json_body(response: Response) -> Value {
        response.json().await.expect("Failed to parse JSON")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Assert a response status code
pub fn assert_status(response: &Response, expected: u16) {
    assert_eq!(
        response.status().as_u16(),
        expected,
        "unexpected status for {}",
        response.url()
    );
}
