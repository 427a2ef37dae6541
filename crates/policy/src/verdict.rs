//! Gate verdicts and their exit-code mapping.

use crate::Mode;
use serde::Serialize;
use std::fmt;

/// Why a request was denied. The first failing check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    UnknownRuntime,
    UnknownMode,
    ModeNotAllowedForRuntime,
    UnknownOperation,
    InsufficientMode,
    MissingCapabilities,
}

impl FailureCategory {
    pub const ALL: [FailureCategory; 6] = [
        FailureCategory::UnknownRuntime,
        FailureCategory::UnknownMode,
        FailureCategory::ModeNotAllowedForRuntime,
        FailureCategory::UnknownOperation,
        FailureCategory::InsufficientMode,
        FailureCategory::MissingCapabilities,
    ];

    pub fn exit_status(self) -> ExitStatus {
        match self {
            FailureCategory::UnknownRuntime | FailureCategory::UnknownMode => ExitStatus::Unknown,
            FailureCategory::MissingCapabilities => ExitStatus::MissingCapability,
            FailureCategory::UnknownOperation
            | FailureCategory::ModeNotAllowedForRuntime
            | FailureCategory::InsufficientMode => ExitStatus::Forbidden,
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureCategory::UnknownRuntime => "unknown runtime",
            FailureCategory::UnknownMode => "unknown mode",
            FailureCategory::ModeNotAllowedForRuntime => "mode not allowed for runtime",
            FailureCategory::UnknownOperation => "unknown operation",
            FailureCategory::InsufficientMode => "insufficient mode",
            FailureCategory::MissingCapabilities => "missing capabilities",
        };
        f.write_str(s)
    }
}

/// Process exit status for a gate invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// 0: the operation may proceed.
    Allowed,
    /// 20: unknown runtime or mode, or broken configuration.
    Unknown,
    /// 21: a required capability is not granted by the resolved mode.
    MissingCapability,
    /// 22: the operation is forbidden for this runtime and mode.
    Forbidden,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Allowed => 0,
            ExitStatus::Unknown => 20,
            ExitStatus::MissingCapability => 21,
            ExitStatus::Forbidden => 22,
        }
    }
}

/// A granted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub operation: String,
    pub runtime: String,
    pub mode: Mode,
    /// Informational note, e.g. when the mode came from the runtime default.
    pub message: Option<String>,
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allowed: operation '{}' in mode {} for runtime '{}'",
            self.operation, self.mode, self.runtime
        )?;
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}

/// A denied request with enough detail to act on without reading the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub category: FailureCategory,
    pub operation: String,
    pub runtime: String,
    /// Resolved mode text; may not name a known mode.
    pub mode: Option<String>,
    pub required_mode: Option<Mode>,
    /// Exact flags the resolved mode lacks.
    pub missing: Vec<String>,
    /// Policy-supplied text for insufficient-mode denials.
    pub reason: Option<String>,
}

impl Denial {
    pub(crate) fn new(
        category: FailureCategory,
        operation: impl Into<String>,
        runtime: impl Into<String>,
    ) -> Self {
        Self {
            category,
            operation: operation.into(),
            runtime: runtime.into(),
            mode: None,
            required_mode: None,
            missing: Vec::new(),
            reason: None,
        }
    }

    pub(crate) fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn exit_status(&self) -> ExitStatus {
        self.category.exit_status()
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = self.mode.as_deref().unwrap_or("-");
        match self.category {
            FailureCategory::UnknownRuntime => write!(
                f,
                "denied ({}): runtime '{}' is not a known runtime profile (operation '{}')",
                self.category, self.runtime, self.operation
            ),
            FailureCategory::UnknownMode => write!(
                f,
                "denied ({}): mode '{mode}' is not a configured mode \
                 (operation '{}', runtime '{}')",
                self.category, self.operation, self.runtime
            ),
            FailureCategory::ModeNotAllowedForRuntime => write!(
                f,
                "denied ({}): runtime '{}' may not operate in mode {mode} (operation '{}')",
                self.category, self.runtime, self.operation
            ),
            FailureCategory::UnknownOperation => write!(
                f,
                "denied ({}): operation '{}' has no policy (mode {mode}, runtime '{}')",
                self.category, self.operation, self.runtime
            ),
            FailureCategory::InsufficientMode => {
                write!(f, "denied ({}): ", self.category)?;
                if let Some(reason) = self.reason.as_deref().filter(|r| !r.is_empty()) {
                    write!(f, "{reason}; ")?;
                }
                write!(f, "operation '{}' requires ", self.operation)?;
                match self.required_mode {
                    Some(required) => write!(f, "{required}")?,
                    None => f.write_str("a higher mode")?,
                }
                write!(f, " but resolved mode is {mode} (runtime '{}')", self.runtime)
            }
            FailureCategory::MissingCapabilities => write!(
                f,
                "denied ({}): operation '{}' in mode {mode} lacks [{}] (runtime '{}')",
                self.category,
                self.operation,
                self.missing.join(", "),
                self.runtime
            ),
        }
    }
}

/// The gate's answer for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Allow(Grant),
    Deny(Denial),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow(_))
    }

    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            Verdict::Allow(_) => None,
            Verdict::Deny(denial) => Some(denial.category),
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Verdict::Allow(_) => ExitStatus::Allowed,
            Verdict::Deny(denial) => denial.exit_status(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow(grant) => fmt::Display::fmt(grant, f),
            Verdict::Deny(denial) => fmt::Display::fmt(denial, f),
        }
    }
}
