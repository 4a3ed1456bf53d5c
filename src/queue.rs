//! The thread-safe FIFO shared between the generator and the senders.

use std::{collections::VecDeque, sync::Mutex};

use crate::{error::Result, message::Message};

/// An unbounded FIFO of messages.
///
/// The single hand-off point between the generator and the sender pool. The
/// lock is held only for the structural change, so none of these operations
/// ever block for a meaningful amount of time.
#[derive(Debug, Default)]
pub struct MessageQueue {
    inner: Mutex<VecDeque<Message>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the tail.
    ///
    /// Fails with [`Error::InvalidMessage`](crate::Error::InvalidMessage) if
    /// the message violates the shape invariants; never blocks otherwise.
    pub fn push(&self, msg: Message) -> Result<()> {
        msg.validate()?;

        self.inner
            .lock()
            .expect("should not panic while holding lock")
            .push_back(msg);

        Ok(())
    }

    /// Remove and return the head, or `None` if the queue is momentarily
    /// empty. Emptiness is not an error; callers decide how to react.
    pub fn pull(&self) -> Option<Message> {
        self.inner
            .lock()
            .expect("should not panic while holding lock")
            .pop_front()
    }

    /// Current depth. The orchestrator uses this as its "still working"
    /// heuristic.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("should not panic while holding lock")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn push_grows_the_queue() {
        let queue = MessageQueue::new();
        assert_eq!(queue.len(), 0);

        let msg = Message::new("fake message", "1234567890");

        queue.push(msg.clone()).unwrap();
        assert_eq!(queue.len(), 1);

        queue.push(msg.clone()).unwrap();
        assert_eq!(queue.len(), 2);

        for _ in 0..5 {
            queue.push(msg.clone()).unwrap();
        }
        assert_eq!(queue.len(), 7);
    }

    #[test]
    fn pull_is_fifo_and_empty_is_none() {
        let queue = MessageQueue::new();

        for i in 1..=5 {
            queue
                .push(Message::new(i.to_string(), "1234567890"))
                .unwrap();
        }

        for i in 1..=5 {
            let pulled = queue.pull().expect("should have a message");
            assert_eq!(pulled.text, i.to_string());
        }

        assert!(queue.pull().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn push_rejects_malformed_messages() {
        let queue = MessageQueue::new();

        let result = queue.push(Message::new("fake message", "12345"));
        assert!(matches!(result, Err(Error::InvalidMessage(_))));

        // Nothing is enqueued on rejection.
        assert_eq!(queue.len(), 0);
    }
}
