//! CLI error types.

use policy::ExitStatus;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The policy tables could not be loaded.
    #[error(transparent)]
    Policy(#[from] policy::Error),

    /// `--check-config` found problems in otherwise loadable tables.
    #[error("policy lint found {count} problem(s)")]
    Lint { count: usize },

    /// Failed to encode a verdict as JSON.
    #[error("failed to encode verdict: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to install the log subscriber.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl Error {
    /// Every CLI failure is a configuration or environment problem.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Error::Policy(e) => e.exit_status(),
            Error::Lint { .. } | Error::Json(_) | Error::Logging(_) => ExitStatus::Unknown,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
