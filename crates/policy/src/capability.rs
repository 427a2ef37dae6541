//! The capability matrix: which boolean flags each mode grants.

use crate::error::SchemaError;
use crate::Mode;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One `[<MODE>]` table of `capabilities.toml`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModeEntry {
    #[serde(default)]
    capabilities: BTreeMap<String, bool>,
}

/// The capability flags declared for a single mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    flags: BTreeMap<String, bool>,
}

impl Capabilities {
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self {
            flags: flags.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Whether `flag` is declared and set to true.
    pub fn grants(&self, flag: &str) -> bool {
        self.flags.get(flag).copied().unwrap_or(false)
    }

    /// Whether `flag` is declared at all, regardless of its value.
    pub fn declares(&self, flag: &str) -> bool {
        self.flags.contains_key(flag)
    }

    /// Flags set to true, in name order.
    pub fn granted(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.as_str())
    }

    /// The subset of `required` this mode does not grant, in request order.
    pub fn missing(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|flag| !self.grants(flag))
            .cloned()
            .collect()
    }
}

/// Mapping from mode to the flags it grants.
///
/// A mode with no entry grants nothing and is reported as unknown by the gate.
#[derive(Debug, Clone, Default)]
pub struct CapabilityMatrix {
    modes: BTreeMap<Mode, Capabilities>,
}

impl CapabilityMatrix {
    /// Parse `capabilities.toml`.
    pub fn parse(toml: &str) -> Result<Self, SchemaError> {
        let doc: BTreeMap<String, ModeEntry> = toml::from_str(toml)?;

        let mut modes = BTreeMap::new();
        for (name, entry) in doc {
            let mode: Mode = name
                .parse()
                .map_err(|e| SchemaError::new(format!("capability matrix: {e}")))?;
            if let Some(flag) = entry.capabilities.keys().find(|k| k.trim().is_empty()) {
                return Err(SchemaError::new(format!(
                    "capability matrix: mode {mode} declares an empty flag name '{flag}'"
                )));
            }
            modes.insert(
                mode,
                Capabilities {
                    flags: entry.capabilities,
                },
            );
        }

        Ok(Self { modes })
    }

    pub fn with_mode(mut self, mode: Mode, capabilities: Capabilities) -> Self {
        self.modes.insert(mode, capabilities);
        self
    }

    pub fn get(&self, mode: Mode) -> Option<&Capabilities> {
        self.modes.get(&mode)
    }

    /// Whether any mode declares `flag`.
    pub fn declares(&self, flag: &str) -> bool {
        self.modes.values().any(|caps| caps.declares(flag))
    }

    /// Entries in ascending rank order.
    pub fn iter(&self) -> impl Iterator<Item = (Mode, &Capabilities)> {
        self.modes.iter().map(|(mode, caps)| (*mode, caps))
    }
}
