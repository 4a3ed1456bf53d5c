//! The statistics monitor: a small HTTP service over a shared collector.
//!
//! Senders running in-process record straight into the collector; the
//! monitor exposes the same collector to external pollers, and accepts
//! reports over `POST /message` from senders running elsewhere.

use std::{
    net::SocketAddr,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::{
    error::{Error, Result},
    message::Message,
    sender::SendOutcome,
    stats::StatsCollector,
};

/// Body of `POST /message`: one outcome report from a sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub message: String,
    pub phone: String,
    pub success: bool,
    pub delay: f64,
}

impl From<&SendOutcome> for ReportRequest {
    fn from(outcome: &SendOutcome) -> Self {
        Self {
            message: outcome.message.text.clone(),
            phone: outcome.message.destination.clone(),
            success: outcome.success,
            delay: outcome.delay,
        }
    }
}

impl ReportRequest {
    /// Rebuild the outcome, enforcing the message shape rules and a
    /// non-negative delay.
    fn into_outcome(self) -> Result<SendOutcome> {
        let message = Message::new(self.message, self.phone);
        message.validate()?;

        if self.delay.is_nan() || self.delay < 0.0 {
            return Err(Error::InvalidMessage(format!(
                "delay must be >= 0, got {}",
                self.delay
            )));
        }

        Ok(SendOutcome {
            message,
            success: self.success,
            delay: self.delay,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub timestamp: f64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IntervalResponse {
    pub interval: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Shared state for the monitor's handlers.
#[derive(Clone)]
pub struct MonitorState {
    pub stats: Arc<StatsCollector>,
    /// Poll interval advertised to external pollers, in seconds.
    pub update_interval: f64,
}

/// Build the monitor router.
pub fn create_router(state: MonitorState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/interval", get(interval_handler))
        .route("/message", post(report_message_handler))
        .route("/statistics", get(statistics_handler))
        .route("/reset", post(reset_handler))
        .with_state(state)
}

/// Handler for `GET /` - healthcheck.
async fn health_handler() -> impl IntoResponse {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    Json(HealthResponse {
        timestamp,
        message: "OK".to_owned(),
    })
}

/// Handler for `GET /interval` - the poll interval for external pollers.
async fn interval_handler(State(state): State<MonitorState>) -> impl IntoResponse {
    Json(IntervalResponse {
        interval: state.update_interval,
    })
}

/// Handler for `POST /message` - fold one report into the statistics.
async fn report_message_handler(
    State(state): State<MonitorState>,
    Json(report): Json<ReportRequest>,
) -> Response {
    match report.into_outcome() {
        Ok(outcome) => {
            state.stats.record(&outcome);
            StatusCode::OK.into_response()
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                message: err.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Handler for `GET /statistics` - the collected statistics.
async fn statistics_handler(State(state): State<MonitorState>) -> impl IntoResponse {
    Json(state.stats.snapshot())
}

/// Handler for `POST /reset` - zero the statistics. Test/ops use only.
async fn reset_handler(State(state): State<MonitorState>) -> impl IntoResponse {
    state.stats.reset();
    StatusCode::OK
}

/// Handle for a running monitor task.
#[derive(Debug)]
pub struct MonitorHandle {
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

impl MonitorHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop serving. The monitor holds no state worth flushing.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Bind and spawn the monitor service.
pub async fn spawn(addr: SocketAddr, state: MonitorState) -> Result<MonitorHandle> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::Bind)?;
    let local_addr = listener.local_addr().map_err(Error::Bind)?;

    let task = tokio::spawn(async move {
        info!(%local_addr, "monitor listening");
        if let Err(err) = axum::serve(listener, create_router(state)).await {
            error!(error = %err, "monitor server exited");
        }
    });

    Ok(MonitorHandle { task, local_addr })
}
