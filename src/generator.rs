//! The producer side of the pipeline.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{message::Message, queue::MessageQueue};

/// Generates a fixed count of random messages and enqueues them.
///
/// Terminates after the final push; never blocks on queue capacity (the
/// queue is unbounded). The generation loop is pure CPU work, so the
/// orchestrator runs it on the blocking pool.
#[derive(Debug)]
pub struct Generator {
    queue: Option<Arc<MessageQueue>>,
    count: u64,
}

impl Generator {
    pub fn new(queue: Arc<MessageQueue>, count: u64) -> Self {
        Self {
            queue: Some(queue),
            count,
        }
    }

    /// A generator with no queue attached. Every generated message is
    /// dropped with a diagnostic: this is a wiring mistake, not a crash.
    pub fn detached(count: u64) -> Self {
        Self { queue: None, count }
    }

    /// Generate and enqueue `count` messages, one per iteration.
    pub fn run(&self) {
        let mut rng = rand::rng();

        for _ in 0..self.count {
            let message = Message::random(&mut rng);

            match &self.queue {
                Some(queue) => {
                    if let Err(error) = queue.push(message) {
                        // Generated messages always satisfy the shape rules,
                        // so this only fires if generation itself is broken.
                        warn!(%error, "generated message rejected by the queue");
                    }
                }
                None => warn!("no queue attached, dropping generated message"),
            }
        }

        debug!(count = self.count, "generator finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_exactly_the_requested_count() {
        let queue = Arc::new(MessageQueue::new());
        let generator = Generator::new(queue.clone(), 25);

        generator.run();

        assert_eq!(queue.len(), 25);
    }

    #[test]
    fn generated_messages_are_well_formed() {
        let queue = Arc::new(MessageQueue::new());
        Generator::new(queue.clone(), 10).run();

        while let Some(message) = queue.pull() {
            message.validate().expect("generated message should be valid");
        }
    }

    #[test]
    fn detached_generator_drops_messages_without_panicking() {
        Generator::detached(5).run();
    }

    #[test]
    fn zero_count_is_a_no_op() {
        let queue = Arc::new(MessageQueue::new());
        Generator::new(queue.clone(), 0).run();
        assert!(queue.is_empty());
    }
}
