//! The orchestrator: wires the pipeline together and drives shutdown.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::{
    config::SimulationConfig,
    error::Result,
    generator::Generator,
    queue::MessageQueue,
    report::{MonitorClient, ReportSink},
    sender::Sender,
    stats::{StatsCollector, StatsSnapshot},
};

/// How often the orchestrator samples the queue depth while waiting for the
/// run to drain.
pub const QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// One simulation run: a generator, a pool of senders and a shared queue.
///
/// Owns the queue and the statistics collector; both are shared by reference
/// with every task it spawns.
pub struct Simulation {
    config: SimulationConfig,
    queue: Arc<MessageQueue>,
    stats: Arc<StatsCollector>,
}

impl Simulation {
    /// Build a simulation. `num_senders` and `sender_settings` are
    /// reconciled, and every sender setting is range-checked here so a
    /// misconfigured pipeline is rejected before any work is enqueued.
    pub fn new(mut config: SimulationConfig) -> Result<Self> {
        config.reconcile_senders();

        for settings in &config.sender_settings {
            settings.validate()?;
        }

        Ok(Self {
            config,
            queue: Arc::new(MessageQueue::new()),
            stats: Arc::new(StatsCollector::new()),
        })
    }

    /// The collector shared with every sender. Hand this to the monitor to
    /// expose the run's statistics over HTTP.
    pub fn stats(&self) -> Arc<StatsCollector> {
        self.stats.clone()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the pipeline to completion and return the final snapshot.
    ///
    /// Shutdown sequence: once every message has been emitted and the queue
    /// has drained, each sender's stop flag is set, then every sender is
    /// joined, then the generator. Stopping only prevents new pulls; a
    /// sender midway through a simulated send finishes and reports first.
    pub async fn run(&self) -> Result<StatsSnapshot> {
        // Attach the external monitor first: a dead monitor aborts the run
        // before anything starts.
        let monitor: Option<Arc<dyn ReportSink>> = match &self.config.monitor_url {
            Some(url) => Some(Arc::new(MonitorClient::connect(url.clone()).await?)),
            None => None,
        };

        let mut senders = Vec::with_capacity(self.config.sender_settings.len());
        for settings in &self.config.sender_settings {
            senders.push(Arc::new(Sender::new(
                self.queue.clone(),
                self.stats.clone(),
                monitor.clone(),
                *settings,
            )?));
        }

        info!(
            senders = senders.len(),
            messages = self.config.num_messages,
            "starting simulation"
        );

        let sender_tasks: Vec<JoinHandle<()>> = senders
            .iter()
            .map(|sender| {
                let sender = Arc::clone(sender);
                tokio::spawn(async move { sender.run().await })
            })
            .collect();

        let generator = Generator::new(self.queue.clone(), self.config.num_messages);
        let generator_task = tokio::task::spawn_blocking(move || generator.run());

        // Completion detection: every message emitted and the queue drained.
        // The queue-empty check alone can race with a sender holding the
        // last message; that is tolerated, since stopping never aborts an
        // in-flight send.
        while !(generator_task.is_finished() && self.queue.is_empty()) {
            tokio::time::sleep(QUEUE_POLL_INTERVAL).await;
        }

        for sender in &senders {
            sender.stop();
        }

        for task in sender_tasks {
            if let Err(err) = task.await {
                error!(error = %err, "sender task failed");
            }
        }
        if let Err(err) = generator_task.await {
            error!(error = %err, "generator task failed");
        }

        info!("all messages consumed");

        Ok(self.stats.snapshot())
    }
}
