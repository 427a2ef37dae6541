//! Policy error types.

use crate::ExitStatus;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the policy tables.
///
/// Authorization outcomes are not errors; they are reported through
/// [`Verdict`](crate::Verdict).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A policy table file does not exist.
    #[error("configuration missing: {}", path.display())]
    ConfigurationMissing { path: PathBuf },

    /// A policy table could not be parsed or failed schema validation.
    #[error("configuration invalid: {}: {reason}", path.display())]
    ConfigurationInvalid { path: PathBuf, reason: String },

    /// An I/O error occurred while reading a policy table.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Every configuration failure exits as unknown/invalid configuration.
    pub fn exit_status(&self) -> ExitStatus {
        ExitStatus::Unknown
    }

    pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A schema violation found while parsing a single policy table.
///
/// The loader attaches the offending file path and reports it as
/// [`Error::ConfigurationInvalid`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SchemaError(pub String);

impl SchemaError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

impl From<toml::de::Error> for SchemaError {
    fn from(e: toml::de::Error) -> Self {
        Self(e.message().to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
