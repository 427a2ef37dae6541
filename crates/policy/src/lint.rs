//! Consistency checks for authored policy tables.
//!
//! The gate does not enforce these at decision time. They describe how the
//! tables are expected to be written and are run by `preflight --check-config`
//! and by the tests over the shipped configuration.

use crate::{GateRequest, Mode, Policy};
use std::fmt;

/// A problem found in otherwise loadable tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// A flag granted at a lower mode is not granted at a higher one.
    NonMonotonicCapability {
        flag: String,
        lower: Mode,
        higher: Mode,
    },
    /// An operation requires a flag that no mode declares.
    UndeclaredCapability { operation: String, flag: String },
    /// A runtime's default mode is outside its allowed set.
    DefaultModeNotAllowed { runtime: String, mode: Mode },
    /// No runtime can be granted the operation in any of its allowed modes.
    UnreachableOperation { operation: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::NonMonotonicCapability {
                flag,
                lower,
                higher,
            } => write!(
                f,
                "capability '{flag}' is granted in {lower} but not in higher mode {higher}"
            ),
            Finding::UndeclaredCapability { operation, flag } => write!(
                f,
                "operation '{operation}' requires capability '{flag}' which no mode declares"
            ),
            Finding::DefaultModeNotAllowed { runtime, mode } => write!(
                f,
                "runtime '{runtime}' defaults to {mode} which is not in its allowed_modes"
            ),
            Finding::UnreachableOperation { operation } => write!(
                f,
                "operation '{operation}' cannot be allowed for any runtime in any allowed mode"
            ),
        }
    }
}

/// Run every check and return the findings in a stable order.
pub fn lint(policy: &Policy) -> Vec<Finding> {
    let mut findings = Vec::new();
    check_monotonic(policy, &mut findings);
    check_declared(policy, &mut findings);
    check_defaults(policy, &mut findings);
    check_reachable(policy, &mut findings);
    findings
}

fn check_monotonic(policy: &Policy, findings: &mut Vec<Finding>) {
    let modes: Vec<_> = policy.capabilities.iter().collect();
    for (i, (lower, lower_caps)) in modes.iter().enumerate() {
        for (higher, higher_caps) in &modes[i + 1..] {
            for flag in lower_caps.granted() {
                if !higher_caps.grants(flag) {
                    findings.push(Finding::NonMonotonicCapability {
                        flag: flag.to_string(),
                        lower: *lower,
                        higher: *higher,
                    });
                }
            }
        }
    }
}

fn check_declared(policy: &Policy, findings: &mut Vec<Finding>) {
    for op in policy.operations.iter() {
        for flag in &op.required_capabilities {
            if !policy.capabilities.declares(flag) {
                findings.push(Finding::UndeclaredCapability {
                    operation: op.operation.clone(),
                    flag: flag.clone(),
                });
            }
        }
    }
}

fn check_defaults(policy: &Policy, findings: &mut Vec<Finding>) {
    for runtime in policy.runtimes.iter() {
        if !runtime.allows(runtime.default_mode) {
            findings.push(Finding::DefaultModeNotAllowed {
                runtime: runtime.id.clone(),
                mode: runtime.default_mode,
            });
        }
    }
}

fn check_reachable(policy: &Policy, findings: &mut Vec<Finding>) {
    for op in policy.operations.iter() {
        let reachable = policy.runtimes.iter().any(|runtime| {
            runtime.allowed_modes.iter().any(|mode| {
                let request =
                    GateRequest::new(&op.operation, &runtime.id).with_mode(mode.as_str());
                policy.evaluate(&request).is_allowed()
            })
        });
        if !reachable {
            findings.push(Finding::UnreachableOperation {
                operation: op.operation.clone(),
            });
        }
    }
}
