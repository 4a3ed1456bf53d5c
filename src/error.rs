use thiserror::Error;

/// An error from the simulation pipeline or the monitor boundary.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A sender was given an out-of-range setting.
    ///
    /// Fatal: a misconfigured pipeline must never start.
    #[error("Invalid sender settings: {0}")]
    InvalidConfig(String),

    /// A message failed shape validation.
    ///
    /// Fatal to that message only; the rest of the pool carries on.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// The monitor answered a report with a non-success status.
    #[error("Monitor rejected the report with HTTP {0}")]
    MonitorStatus(reqwest::StatusCode),

    /// The monitor could not be reached at all.
    #[error("Monitor unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The monitor listener could not be bound.
    #[error("Unable to bind the monitor listener: {0}")]
    Bind(std::io::Error),

    /// The config file could not be read.
    #[error("Unable to read the config file: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// The config file could not be parsed.
    #[error("Unable to parse the config file: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
