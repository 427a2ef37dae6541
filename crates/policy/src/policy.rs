//! Policy loading and the gate engine.

use crate::error::SchemaError;
use crate::{
    CapabilityMatrix, Denial, Error, FailureCategory, Grant, Mode, OperationTable, Result,
    RuntimeTable, Verdict,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CAPABILITIES_FILE: &str = "capabilities.toml";
pub const RUNTIMES_FILE: &str = "runtimes.toml";
pub const OPERATIONS_FILE: &str = "operations.toml";

/// Locations of the three policy tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub capabilities: PathBuf,
    pub runtimes: PathBuf,
    pub operations: PathBuf,
}

impl TablePaths {
    /// The standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            capabilities: dir.join(CAPABILITIES_FILE),
            runtimes: dir.join(RUNTIMES_FILE),
            operations: dir.join(OPERATIONS_FILE),
        }
    }
}

/// A request to run a gated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    pub operation: String,
    /// Explicit mode; the runtime default applies when `None`.
    pub mode: Option<String>,
    pub runtime: String,
}

impl GateRequest {
    pub fn new(operation: impl Into<String>, runtime: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            mode: None,
            runtime: runtime.into(),
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

/// The three policy tables, loaded together.
///
/// A `Policy` is never mutated after loading. Callers that live longer than
/// one decision call [`Policy::load`] again to pick up changes.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub capabilities: CapabilityMatrix,
    pub runtimes: RuntimeTable,
    pub operations: OperationTable,
}

impl Policy {
    /// Load all three tables. Fails on the first missing or invalid table.
    pub fn load(paths: &TablePaths) -> Result<Self> {
        let capabilities = read_table(&paths.capabilities, CapabilityMatrix::parse)?;
        let runtimes = read_table(&paths.runtimes, RuntimeTable::parse)?;
        let operations = read_table(&paths.operations, OperationTable::parse)?;

        debug!(
            runtimes = runtimes.len(),
            operations = operations.len(),
            "policy tables loaded"
        );

        Ok(Self {
            capabilities,
            runtimes,
            operations,
        })
    }

    /// Load the standard table files from `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(&TablePaths::in_dir(dir))
    }

    /// Decide whether `request` may proceed.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// runtime, mode, mode allowed for runtime, mode present in the
    /// capability matrix, operation, mode rank, capabilities.
    pub fn check(&self, request: &GateRequest) -> Verdict {
        let verdict = self.evaluate(request);
        match &verdict {
            Verdict::Allow(grant) => info!(
                operation = %grant.operation,
                runtime = %grant.runtime,
                mode = %grant.mode,
                "preflight allowed"
            ),
            Verdict::Deny(denial) => info!(
                operation = %denial.operation,
                runtime = %denial.runtime,
                category = %denial.category,
                "preflight denied"
            ),
        }
        verdict
    }

    /// [`Policy::check`] without logging the verdict.
    pub(crate) fn evaluate(&self, request: &GateRequest) -> Verdict {
        let deny = |category| Denial::new(category, &request.operation, &request.runtime);

        let Some(runtime) = self.runtimes.get(&request.runtime) else {
            return Verdict::Deny(deny(FailureCategory::UnknownRuntime));
        };

        let (mode_name, defaulted) = match &request.mode {
            Some(explicit) => (explicit.clone(), false),
            None => (runtime.default_mode.as_str().to_string(), true),
        };
        debug!(mode = %mode_name, defaulted, "resolved mode");

        let Ok(mode) = mode_name.parse::<Mode>() else {
            return Verdict::Deny(deny(FailureCategory::UnknownMode).with_mode(mode_name));
        };

        if !runtime.allows(mode) {
            return Verdict::Deny(
                deny(FailureCategory::ModeNotAllowedForRuntime).with_mode(mode.as_str()),
            );
        }

        let Some(granted) = self.capabilities.get(mode) else {
            debug!(%mode, "mode has no capability matrix entry");
            return Verdict::Deny(deny(FailureCategory::UnknownMode).with_mode(mode.as_str()));
        };

        let Some(policy) = self.operations.get(&request.operation) else {
            return Verdict::Deny(
                deny(FailureCategory::UnknownOperation).with_mode(mode.as_str()),
            );
        };

        if !mode.satisfies(policy.required_mode) {
            let mut denial = deny(FailureCategory::InsufficientMode).with_mode(mode.as_str());
            denial.required_mode = Some(policy.required_mode);
            denial.reason = Some(policy.deny_reason.clone());
            return Verdict::Deny(denial);
        }

        let missing = granted.missing(&policy.required_capabilities);
        if !missing.is_empty() {
            let mut denial =
                deny(FailureCategory::MissingCapabilities).with_mode(mode.as_str());
            denial.required_mode = Some(policy.required_mode);
            denial.missing = missing;
            return Verdict::Deny(denial);
        }

        Verdict::Allow(Grant {
            operation: request.operation.clone(),
            runtime: runtime.id.clone(),
            mode,
            message: defaulted.then(|| format!("mode {mode} is the runtime default")),
        })
    }
}

fn read_table<T>(
    path: &Path,
    parse: impl FnOnce(&str) -> std::result::Result<T, SchemaError>,
) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => Error::ConfigurationMissing {
            path: path.to_path_buf(),
        },
        _ => Error::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let content = String::from_utf8(bytes)
        .map_err(|e| Error::invalid(path, format!("not valid UTF-8: {}", e.utf8_error())))?;
    parse(&content).map_err(|e| Error::invalid(path, e.0))
}
