//! Locating the policy tables.

use policy::TablePaths;
use std::path::PathBuf;

/// Where the tables live when nothing else is given.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Table locations as given on the command line.
#[derive(Debug, Default)]
pub struct ConfigSource {
    /// Directory holding the three standard table files.
    pub dir: PathBuf,
    pub capabilities: Option<PathBuf>,
    pub runtimes: Option<PathBuf>,
    pub operations: Option<PathBuf>,
}

impl ConfigSource {
    /// Resolve to concrete paths. Per-file overrides win over the directory.
    pub fn resolve(self) -> TablePaths {
        let defaults = TablePaths::in_dir(&self.dir);
        TablePaths {
            capabilities: self.capabilities.unwrap_or(defaults.capabilities),
            runtimes: self.runtimes.unwrap_or(defaults.runtimes),
            operations: self.operations.unwrap_or(defaults.operations),
        }
    }
}
