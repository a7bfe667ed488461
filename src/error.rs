/// Error types for the trajectory cleaning pipeline
///
/// Parsing is all-or-nothing, so a malformed document is a single
/// `InvalidInput` with no position information.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanError {
    #[error("Invalid JSON input")]
    InvalidInput,
    #[error("Empty input")]
    EmptyTrajectory,
    #[error("processing failure: {0}")]
    ProcessingFailure(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CleanError>;
