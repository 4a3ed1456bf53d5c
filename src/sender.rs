//! The worker side of the pipeline: pull, simulate a send, report.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use rand::Rng;
use tracing::{debug, error, warn};

use crate::{
    config::SenderSettings, error::Result, message::Message, queue::MessageQueue,
    report::ReportSink, stats::StatsCollector,
};

/// The result of simulating one send: pass/fail plus the simulated delay.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub message: Message,
    pub success: bool,
    /// Seconds spent "sending". Always >= 0.
    pub delay: f64,
}

/// A single sender: repeatedly pulls a message, simulates sending it and
/// reports the outcome.
///
/// Each sender runs as its own tokio task so that one sender's simulated
/// delay never holds up its siblings. Cancellation is cooperative: the
/// orchestrator sets the stop flag and the sender observes it at the top of
/// each iteration and after an empty-queue backoff. A send that is already
/// in flight always completes and reports.
pub struct Sender {
    mean_delay: f64,
    fail_rate: f64,
    queue: Arc<MessageQueue>,
    stats: Arc<StatsCollector>,
    monitor: Option<Arc<dyn ReportSink>>,
    stop: AtomicBool,
}

impl Sender {
    /// Construct a sender, rejecting out-of-range settings eagerly with
    /// [`Error::InvalidConfig`](crate::Error::InvalidConfig) so a
    /// misconfigured pipeline never starts.
    pub fn new(
        queue: Arc<MessageQueue>,
        stats: Arc<StatsCollector>,
        monitor: Option<Arc<dyn ReportSink>>,
        settings: SenderSettings,
    ) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            mean_delay: settings.mean_delay,
            fail_rate: settings.fail_rate,
            queue,
            stats,
            monitor,
            stop: AtomicBool::new(false),
        })
    }

    /// Tell the sender to stop once its current iteration finishes.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Consume messages until stopped.
    pub async fn run(&self) {
        while !self.is_stopped() {
            let Some(message) = self.queue.pull() else {
                // The generator may just not have caught up yet. Back off
                // for the configured mean delay instead of spinning, then
                // re-check the stop flag.
                let backoff = Duration::from_secs_f64(self.mean_delay);
                if backoff.is_zero() {
                    // A zero-length sleep completes without yielding; give
                    // the scheduler a turn explicitly.
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(backoff).await;
                }
                continue;
            };

            match self.send(message).await {
                Ok(outcome) => self.report(&outcome).await,
                // Fatal to this message only. Log and keep consuming.
                Err(err) => warn!(error = %err, "dropping malformed message"),
            }
        }

        debug!("sender stopped");
    }

    /// Simulate sending one message: validate, wait a random delay in
    /// `[0, 2 * mean_delay]`, then draw the pass/fail outcome.
    pub async fn send(&self, message: Message) -> Result<SendOutcome> {
        message.validate()?;

        let (delay, success) = draw(&mut rand::rng(), self.mean_delay, self.fail_rate);
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;

        Ok(SendOutcome {
            message,
            success,
            delay,
        })
    }

    /// Record the outcome locally and forward it to the monitor, if one is
    /// attached. A failed report is surfaced in the log but never brings the
    /// sender down.
    async fn report(&self, outcome: &SendOutcome) {
        self.stats.record(outcome);

        if let Some(monitor) = &self.monitor {
            if let Err(err) = monitor.report(outcome).await {
                error!(error = %err, "failed to report outcome to the monitor");
            }
        }
    }
}

/// Draw the simulated delay and pass/fail outcome for one send.
///
/// The success draw is uniform in `[0,1)` and succeeds when it exceeds the
/// fail rate.
fn draw<R: Rng + ?Sized>(rng: &mut R, mean_delay: f64, fail_rate: f64) -> (f64, bool) {
    let delay = rng.random_range(0.0..=2.0 * mean_delay);
    let success = rng.random::<f64>() > fail_rate;
    (delay, success)
}
