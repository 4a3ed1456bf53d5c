//! Simulates a bulk SMS sending workload: a generator produces random
//! messages into a shared queue, a pool of senders "sends" each one with a
//! randomised delay and pass/fail outcome, and a monitor serves the running
//! statistics over HTTP. No carrier was harmed.

pub mod config;
pub mod error;
pub mod generator;
pub mod message;
pub mod monitor;
pub mod queue;
pub mod report;
pub mod sender;
pub mod simulation;
pub mod stats;

pub use error::{Error, Result};
