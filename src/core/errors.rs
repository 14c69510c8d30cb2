use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the domain, storage, and transfer layers.
#[derive(Error, Debug)]
pub enum SubscriptionError {
    #[error("Subscription not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    StorageFailure(String),
    #[error("Invalid bundle: {0}")]
    BundleInvalid(String),
}

pub type Result<T> = StdResult<T, SubscriptionError>;

impl From<std::io::Error> for SubscriptionError {
    fn from(err: std::io::Error) -> Self {
        SubscriptionError::StorageFailure(err.to_string())
    }
}

impl From<serde_json::Error> for SubscriptionError {
    fn from(err: serde_json::Error) -> Self {
        SubscriptionError::StorageFailure(err.to_string())
    }
}

impl From<csv::Error> for SubscriptionError {
    fn from(err: csv::Error) -> Self {
        SubscriptionError::StorageFailure(err.to_string())
    }
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] SubscriptionError),
    #[error("Command failed: {0}")]
    Command(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
