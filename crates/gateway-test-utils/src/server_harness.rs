//! Test server harness for E2E testing
//!
//! Provides `TestGatewayServer` for spawning real gateway instances in tests,
//! pointed at a fake conferencing server (typically a wiremock `MockServer`).

use conference_gateway::config::Config;
use conference_gateway::observability::metrics::init_metrics_recorder;
use conference_gateway::repositories::MeetingStore;
use conference_gateway::routes::{self, AppState};
use conference_gateway::services::{BbbClient, ConferenceApi, RequestSigner};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

/// Shared secret used by every test server.
pub const TEST_API_SECRET: &str = "test-shared-secret";

/// Global metrics handle for test servers
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}

/// Test harness for spawning the Conference Gateway in E2E tests.
///
/// # Example
/// ```rust,ignore
/// let upstream = MockServer::start().await;
/// let server = TestGatewayServer::spawn(&upstream.uri()).await?;
/// let response = reqwest::get(format!("{}/api/getMeetings", server.url())).await?;
/// ```
pub struct TestGatewayServer {
    addr: SocketAddr,
    config: Config,
    store: Arc<MeetingStore>,
    _handle: JoinHandle<()>,
}

impl TestGatewayServer {
    /// Spawn a server whose conferencing server is `upstream_url`.
    pub async fn spawn(upstream_url: &str) -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(upstream_url, &[]).await
    }

    /// Spawn a server with extra environment variables layered over the
    /// test defaults.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Skip the startup warm-up
    /// - Start the HTTP server in the background
    pub async fn spawn_with_vars(
        upstream_url: &str,
        extra_vars: &[(&str, &str)],
    ) -> Result<Self, anyhow::Error> {
        let mut vars = HashMap::from([
            ("BBB_API_SECRET".to_string(), TEST_API_SECRET.to_string()),
            ("BBB_SERVER_URL".to_string(), upstream_url.to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("UPSTREAM_TIMEOUT_SECONDS".to_string(), "2".to_string()),
            ("SAMPLE_MEETING_TIMEOUT_SECONDS".to_string(), "1".to_string()),
            (
                "INIT_SAMPLE_MEETINGS_ON_STARTUP".to_string(),
                "false".to_string(),
            ),
        ]);
        for (key, value) in extra_vars {
            vars.insert((*key).to_string(), (*value).to_string());
        }

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let signer = RequestSigner::from_config(&config);
        let api: Arc<dyn ConferenceApi> = Arc::new(
            BbbClient::new(signer, config.upstream_timeout)
                .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?,
        );
        let store = Arc::new(MeetingStore::new());

        let state = Arc::new(AppState {
            config: config.clone(),
            api,
            store: store.clone(),
        });

        // Build routes using the gateway's real route builder
        let app = routes::build_routes(state, test_metrics_handle());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            store,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The server's Jitsi demo store.
    pub fn store(&self) -> &MeetingStore {
        &self.store
    }

    /// A signer with the server's secret, for computing expected checksums.
    pub fn signer(&self) -> RequestSigner {
        RequestSigner::from_config(&self.config)
    }

    /// A client that does not follow redirects, so `302` join responses can
    /// be inspected.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("reqwest client should build")
    }
}

impl Drop for TestGatewayServer {
    fn drop(&mut self) {
        // Abort the HTTP server task so the port is released when the test ends
        self._handle.abort();
    }
}
