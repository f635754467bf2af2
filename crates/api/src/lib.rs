//! Infra Monitor API Server
//!
//! REST API backing the infrastructure dashboard: server-list persistence
//! and Slack alerting for server status transitions.

use alerting::{AlertConfigStore, AlertCoordinator, AlertStateStore};
use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    routing::post,
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use notifier::{NotificationChannel, NotifyError, SlackChannel};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use storage::ServerListStore;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

pub mod error;
mod routes;
pub mod settings;

pub use settings::Settings;
use settings::{LogFormat, LoggingSettings};

/// Application state shared across handlers
pub struct AppState {
    /// Alert state machine and its stores
    pub coordinator: AlertCoordinator,
    /// Server-list document
    pub servers: ServerListStore,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus exporter, when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(coordinator: AlertCoordinator, servers: ServerListStore) -> Self {
        Self {
            coordinator,
            servers,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Build stores and the Slack channel from settings
    pub fn from_settings(settings: &Settings) -> Result<Self, NotifyError> {
        let channel = match settings.slack.client_config() {
            Some(config) => {
                Some(Arc::new(SlackChannel::new(config)?) as Arc<dyn NotificationChannel>)
            }
            None => None,
        };

        let coordinator = AlertCoordinator::new(
            AlertConfigStore::new(&settings.data.alert_config_file),
            AlertStateStore::new(&settings.data.alert_state_file),
            channel,
        );
        Ok(Self::new(
            coordinator,
            ServerListStore::new(&settings.data.servers_file),
        ))
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/servers",
            get(routes::servers::get_servers).post(routes::servers::save_servers),
        )
        .route("/alert", post(routes::alerts::post_alert))
        .route(
            "/alert/config",
            get(routes::alerts::get_config).post(routes::alerts::update_config),
        )
        .route("/alert/state", get(routes::alerts::get_state));

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let level = settings.max_level()?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let installed = match settings.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.finish()),
    };
    installed.context("Failed to install tracing subscriber")
}

/// Run the server until Ctrl-C or SIGTERM
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let mut state = AppState::from_settings(&settings).context("Invalid Slack configuration")?;

    if settings.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        state = state.with_metrics(handle);
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", settings.server.bind_address);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server.bind_address))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
