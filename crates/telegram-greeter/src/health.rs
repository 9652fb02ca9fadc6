//! Health check and metrics endpoint

use std::sync::Arc;
use std::time::SystemTime;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use greeter_core::{HandlerReport, Outcome};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Health check status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub uptime_seconds: u64,
    pub telegram_connected: bool,
    pub bot_username: Option<String>,
}

/// Metrics data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub updates_received: u64,
    pub messages_observed: u64,
    pub joins_observed: u64,
    pub greetings_sent: u64,
    pub greetings_suppressed: u64,
    pub trigger_replies: u64,
    pub command_replies: u64,
    pub errors: u64,
    pub active_chats: usize,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<RwLock<Metrics>>,
    pub start_time: SystemTime,
    pub bot_username: Option<String>,
    pub telegram_connected: Arc<RwLock<bool>>,
}

impl AppState {
    pub fn new(bot_username: Option<String>) -> Self {
        Self {
            metrics: Arc::new(RwLock::new(Metrics::default())),
            start_time: SystemTime::now(),
            bot_username,
            telegram_connected: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn increment_updates_received(&self) {
        let mut metrics = self.metrics.write().await;
        metrics.updates_received += 1;
    }

    /// Fold one dispatch report into the counters.
    pub async fn record(&self, reports: &[HandlerReport], active_chats: usize) {
        let mut metrics = self.metrics.write().await;
        metrics.active_chats = active_chats;

        for report in reports {
            if report.outcome == Outcome::Failed {
                metrics.errors += 1;
            }
            match (report.handler, report.outcome) {
                ("activity", Outcome::Observed) => metrics.messages_observed += 1,
                ("greeting", outcome) => {
                    metrics.joins_observed += 1;
                    match outcome {
                        Outcome::Sent(_) => metrics.greetings_sent += 1,
                        Outcome::Suppressed => metrics.greetings_suppressed += 1,
                        _ => {}
                    }
                }
                ("keyword", Outcome::Sent(_)) => metrics.trigger_replies += 1,
                ("commands", Outcome::Sent(_)) => metrics.command_replies += 1,
                _ => {}
            }
        }
    }

    pub async fn set_telegram_connected(&self, connected: bool) {
        *self.telegram_connected.write().await = connected;
    }
}

/// Health check endpoint handler
async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let uptime = state.start_time.elapsed().unwrap_or_default().as_secs();

    let telegram_connected = *state.telegram_connected.read().await;

    let (status, status_code) = if telegram_connected {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        status_code,
        Json(HealthStatus {
            status: status.to_string(),
            uptime_seconds: uptime,
            telegram_connected,
            bot_username: state.bot_username.clone(),
        }),
    )
}

/// Metrics endpoint handler
async fn metrics_handler(State(state): State<AppState>) -> Json<Metrics> {
    let metrics = state.metrics.read().await;
    Json(metrics.clone())
}

/// Create health check router
pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/ready", get(ready_handler))
        .route("/live", get(live_handler))
        .with_state(state)
}

/// Readiness check (ready to accept traffic)
async fn ready_handler(State(state): State<AppState>) -> StatusCode {
    if *state.telegram_connected.read().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Liveness check (process is alive)
async fn live_handler() -> StatusCode {
    StatusCode::OK
}

/// Start health check server
pub async fn start_health_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_health_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Health check server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
