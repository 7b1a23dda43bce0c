//! Conference Gateway
//!
//! Entry point for the Lectern conferencing proxy. Signs and forwards
//! dashboard requests to the conferencing server and serves the Jitsi demo
//! backend.

use common::observability::{init_tracing, ObservabilityConfig};
use conference_gateway::config::Config;
use conference_gateway::observability::metrics::init_metrics_recorder;
use conference_gateway::repositories::MeetingStore;
use conference_gateway::routes::{self, AppState};
use conference_gateway::services::{BbbClient, ConferenceApi, RequestSigner};
use conference_gateway::tasks;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "conference_gateway=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let vars: HashMap<String, String> = std::env::vars().collect();

    init_tracing(&ObservabilityConfig::from_vars(&vars, DEFAULT_LOG_FILTER))?;

    info!("Starting Conference Gateway");

    // Load configuration
    let config = Config::from_vars(&vars).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        bbb_server_url = %config.bbb_server_url,
        jitsi_domain = %config.jitsi_domain,
        upstream_timeout_secs = config.upstream_timeout.as_secs(),
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    let signer = RequestSigner::from_config(&config);
    let api: Arc<dyn ConferenceApi> = Arc::new(BbbClient::new(signer, config.upstream_timeout)?);

    if config.init_sample_meetings_on_startup {
        tokio::spawn(tasks::warm_up(api.clone(), config.startup_warmup_timeout));
    } else {
        info!("Skipping sample meeting warm-up (INIT_SAMPLE_MEETINGS_ON_STARTUP=false)");
    }

    if !config.recordings_dir.is_dir() {
        warn!(
            recordings_dir = %config.recordings_dir.display(),
            "Recordings directory does not exist, recording downloads will return 404"
        );
    }

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();
    let drain_period = config.drain_period;

    let state = Arc::new(AppState {
        config,
        api,
        store: Arc::new(MeetingStore::new()),
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Conference Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(drain_period))
    .await?;

    info!("Conference Gateway shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a shutdown signal is received and the drain period is complete.
async fn shutdown_signal(drain: Duration) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    if drain.is_zero() {
        info!("Skipping drain period (DRAIN_SECONDS=0)");
    } else {
        warn!("Draining connections for {} seconds...", drain.as_secs());
        tokio::time::sleep(drain).await;
        info!("Drain period complete");
    }
}
