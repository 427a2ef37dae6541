//! Operation policies: what each gated action requires.

use crate::error::SchemaError;
use crate::Mode;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OperationDocument {
    #[serde(default)]
    operation: Vec<OperationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OperationEntry {
    operation: String,
    required_mode: String,
    #[serde(default)]
    required_capabilities: Vec<String>,
    deny_reason: String,
}

/// A gated action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPolicy {
    pub operation: String,
    /// Minimum mode the caller must be operating in.
    pub required_mode: Mode,
    /// Every flag must be granted by the resolved mode.
    pub required_capabilities: Vec<String>,
    /// Shown verbatim when the mode requirement is not met.
    pub deny_reason: String,
}

impl OperationPolicy {
    pub fn new(operation: impl Into<String>, required_mode: Mode) -> Self {
        Self {
            operation: operation.into(),
            required_mode,
            required_capabilities: Vec::new(),
            deny_reason: String::new(),
        }
    }

    pub fn with_capabilities<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_capabilities = flags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deny_reason(mut self, reason: impl Into<String>) -> Self {
        self.deny_reason = reason.into();
        self
    }
}

/// All operation policies keyed by operation id.
#[derive(Debug, Clone, Default)]
pub struct OperationTable {
    policies: BTreeMap<String, OperationPolicy>,
}

impl OperationTable {
    /// Parse `operations.toml`.
    ///
    /// An unrecognised `required_mode` is a schema error, so a broken policy
    /// file is reported as configuration rather than as a denial.
    pub fn parse(toml: &str) -> Result<Self, SchemaError> {
        let doc: OperationDocument = toml::from_str(toml)?;

        let mut table = Self::default();
        for entry in doc.operation {
            if entry.operation.trim().is_empty() {
                return Err(SchemaError::new("operation policy: empty operation id"));
            }
            let required_mode = entry.required_mode.parse().map_err(|e| {
                SchemaError::new(format!(
                    "operation policy: operation '{}': {e}",
                    entry.operation
                ))
            })?;
            if entry
                .required_capabilities
                .iter()
                .any(|flag| flag.trim().is_empty())
            {
                return Err(SchemaError::new(format!(
                    "operation policy: operation '{}' lists an empty capability name",
                    entry.operation
                )));
            }
            table.insert(OperationPolicy {
                operation: entry.operation,
                required_mode,
                required_capabilities: entry.required_capabilities,
                deny_reason: entry.deny_reason,
            })?;
        }
        Ok(table)
    }

    /// Add a policy, rejecting duplicate operation ids.
    pub fn insert(&mut self, policy: OperationPolicy) -> Result<(), SchemaError> {
        if self.policies.contains_key(&policy.operation) {
            return Err(SchemaError::new(format!(
                "operation policy: duplicate operation '{}'",
                policy.operation
            )));
        }
        self.policies.insert(policy.operation.clone(), policy);
        Ok(())
    }

    pub fn get(&self, operation: &str) -> Option<&OperationPolicy> {
        self.policies.get(operation)
    }

    /// Policies in operation-id order.
    pub fn iter(&self) -> impl Iterator<Item = &OperationPolicy> {
        self.policies.values()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
