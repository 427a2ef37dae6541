//! Runtime profiles: calling environments and the modes they may request.

use crate::error::SchemaError;
use crate::Mode;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuntimeDocument {
    #[serde(default)]
    runtime: Vec<RuntimeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuntimeEntry {
    id: String,
    default_mode: String,
    allowed_modes: Vec<String>,
}

/// A calling environment identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeProfile {
    pub id: String,
    /// Used when the caller does not name a mode.
    pub default_mode: Mode,
    /// Never empty once loaded.
    pub allowed_modes: BTreeSet<Mode>,
}

impl RuntimeProfile {
    pub fn new(
        id: impl Into<String>,
        default_mode: Mode,
        allowed_modes: impl IntoIterator<Item = Mode>,
    ) -> Self {
        Self {
            id: id.into(),
            default_mode,
            allowed_modes: allowed_modes.into_iter().collect(),
        }
    }

    pub fn allows(&self, mode: Mode) -> bool {
        self.allowed_modes.contains(&mode)
    }
}

/// All runtime profiles keyed by id.
#[derive(Debug, Clone, Default)]
pub struct RuntimeTable {
    profiles: BTreeMap<String, RuntimeProfile>,
}

impl RuntimeTable {
    /// Parse `runtimes.toml`.
    pub fn parse(toml: &str) -> Result<Self, SchemaError> {
        let doc: RuntimeDocument = toml::from_str(toml)?;

        let mut table = Self::default();
        for entry in doc.runtime {
            let profile = validate(entry)?;
            table.insert(profile)?;
        }
        Ok(table)
    }

    /// Add a profile, rejecting duplicate ids.
    pub fn insert(&mut self, profile: RuntimeProfile) -> Result<(), SchemaError> {
        if self.profiles.contains_key(&profile.id) {
            return Err(SchemaError::new(format!(
                "runtime profiles: duplicate runtime id '{}'",
                profile.id
            )));
        }
        self.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&RuntimeProfile> {
        self.profiles.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuntimeProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn validate(entry: RuntimeEntry) -> Result<RuntimeProfile, SchemaError> {
    if entry.id.trim().is_empty() {
        return Err(SchemaError::new("runtime profiles: empty runtime id"));
    }

    let parse_mode = |name: &str| -> Result<Mode, SchemaError> {
        name.parse().map_err(|e| {
            SchemaError::new(format!("runtime profiles: runtime '{}': {e}", entry.id))
        })
    };

    let default_mode = parse_mode(&entry.default_mode)?;
    let allowed_modes = entry
        .allowed_modes
        .iter()
        .map(|name| parse_mode(name.as_str()))
        .collect::<Result<BTreeSet<_>, _>>()?;

    if allowed_modes.is_empty() {
        return Err(SchemaError::new(format!(
            "runtime profiles: runtime '{}' has no allowed_modes",
            entry.id
        )));
    }

    Ok(RuntimeProfile {
        id: entry.id,
        default_mode,
        allowed_modes,
    })
}
