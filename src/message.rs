//! The message value type and its shape rules.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MIN_TEXT_LEN: usize = 1;
pub const MAX_TEXT_LEN: usize = 100;
pub const DESTINATION_LEN: usize = 10;

/// Printable ASCII, space through tilde.
const TEXT_CHARSET: std::ops::RangeInclusive<u8> = 0x20..=0x7e;

/// A single SMS: some text and a 10-digit destination number.
///
/// Immutable once handed to the queue. The fields are public so that
/// malformed messages remain representable — validation happens at the
/// queue and sender boundaries, not in a constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub destination: String,
}

impl Message {
    pub fn new(text: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            destination: destination.into(),
        }
    }

    /// Check the shape invariants: text length in `[1,100]`, destination
    /// exactly 10 ASCII digits.
    pub fn validate(&self) -> Result<()> {
        let text_len = self.text.chars().count();
        if !(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&text_len) {
            return Err(Error::InvalidMessage(format!(
                "text length must be in [{MIN_TEXT_LEN},{MAX_TEXT_LEN}], got {text_len}"
            )));
        }

        if self.destination.len() != DESTINATION_LEN
            || !self.destination.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::InvalidMessage(format!(
                "destination must be exactly {DESTINATION_LEN} digits, got {:?}",
                self.destination
            )));
        }

        Ok(())
    }

    /// Generate a message with uniformly random text length in `[1,100]`,
    /// printable-ASCII characters and a 10-digit destination.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let text_len = rng.random_range(MIN_TEXT_LEN..=MAX_TEXT_LEN);
        let text = (0..text_len)
            .map(|_| char::from(rng.random_range(TEXT_CHARSET)))
            .collect();

        let destination = (0..DESTINATION_LEN)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();

        Self { text, destination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_message_passes_validation() {
        let msg = Message::new("hello there", "1234567890");
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn text_length_bounds_are_inclusive() {
        assert!(Message::new("a", "1234567890").validate().is_ok());
        assert!(Message::new("a".repeat(100), "1234567890").validate().is_ok());

        assert!(matches!(
            Message::new("", "1234567890").validate(),
            Err(Error::InvalidMessage(_))
        ));
        assert!(matches!(
            Message::new("a".repeat(101), "1234567890").validate(),
            Err(Error::InvalidMessage(_))
        ));
    }

    #[test]
    fn destination_must_be_ten_digits() {
        assert!(matches!(
            Message::new("hi", "12345").validate(),
            Err(Error::InvalidMessage(_))
        ));
        assert!(matches!(
            Message::new("hi", "123456789AB").validate(),
            Err(Error::InvalidMessage(_))
        ));
        // Right length, wrong characters.
        assert!(matches!(
            Message::new("hi", "12345678pq").validate(),
            Err(Error::InvalidMessage(_))
        ));
    }

    #[test]
    fn random_messages_are_always_valid() {
        let mut rng = rand::rng();
        for _ in 0..500 {
            let msg = Message::random(&mut rng);
            msg.validate().expect("generated message should be valid");
            assert!(msg.destination.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn random_messages_vary() {
        let mut rng = rand::rng();
        let a = Message::random(&mut rng);
        let b = Message::random(&mut rng);
        // Text is drawn from 95^len possibilities; a collision here would
        // point at a broken RNG hookup rather than bad luck.
        assert_ne!(a.text, b.text);
    }
}
