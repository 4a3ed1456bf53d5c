//! Reporting outcomes across the monitor boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    monitor::ReportRequest,
    sender::SendOutcome,
    stats::StatsSnapshot,
};

/// Somewhere a sender can deliver outcome reports beyond its own collector.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Deliver one outcome. A non-success answer is an error for this report;
    /// it is not retried.
    async fn report(&self, outcome: &SendOutcome) -> Result<()>;
}

/// Health-check attempts made when attaching to a monitor. Attachment is the
/// only point where anything is retried.
pub const CONNECT_ATTEMPTS: u32 = 3;
const CONNECT_BACKOFF: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the monitor's reporting and statistics endpoints.
pub struct MonitorClient {
    base_url: String,
    client: Client,
}

impl MonitorClient {
    /// Build a client without checking that the monitor is up.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { base_url, client })
    }

    /// Attach to a monitor, health-checking `GET /` up to
    /// [`CONNECT_ATTEMPTS`] times before giving up with the last error.
    pub async fn connect(base_url: impl Into<String>) -> Result<Self> {
        let client = Self::new(base_url)?;

        let mut attempt = 1;
        loop {
            match client.health_check().await {
                Ok(()) => {
                    debug!(url = %client.base_url, "attached to monitor");
                    return Ok(client);
                }
                Err(err) if attempt < CONNECT_ATTEMPTS => {
                    warn!(error = %err, attempt, "monitor health check failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(CONNECT_BACKOFF).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await?;

        check_status(response.status())
    }

    /// Fetch the monitor's current statistics.
    pub async fn statistics(&self) -> Result<StatsSnapshot> {
        let response = self
            .client
            .get(format!("{}/statistics", self.base_url))
            .send()
            .await?;

        check_status(response.status())?;
        Ok(response.json().await?)
    }

    /// Zero the monitor's statistics. Test/ops use only.
    pub async fn reset(&self) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/reset", self.base_url))
            .send()
            .await?;

        check_status(response.status())
    }
}

#[async_trait]
impl ReportSink for MonitorClient {
    async fn report(&self, outcome: &SendOutcome) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/message", self.base_url))
            .json(&ReportRequest::from(outcome))
            .send()
            .await?;

        check_status(response.status())
    }
}

fn check_status(status: StatusCode) -> Result<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::MonitorStatus(status))
    }
}
