//! Operating modes and their privilege ordering.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A privilege level a runtime may operate in.
///
/// Modes are totally ordered by [`Mode::rank`]. Comparisons between modes
/// always go through the rank, never through declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mode {
    #[serde(rename = "WEB_SAFE")]
    WebSafe,
    #[serde(rename = "LOCAL_STANDARD")]
    LocalStandard,
    #[serde(rename = "LOCAL_PRIVILEGED")]
    LocalPrivileged,
}

impl Mode {
    /// Every mode, lowest rank first.
    pub const ALL: [Mode; 3] = [Mode::WebSafe, Mode::LocalStandard, Mode::LocalPrivileged];

    /// Explicit privilege rank.
    pub fn rank(self) -> u8 {
        match self {
            Mode::WebSafe => 0,
            Mode::LocalStandard => 1,
            Mode::LocalPrivileged => 2,
        }
    }

    /// Canonical name as it appears in configuration and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::WebSafe => "WEB_SAFE",
            Mode::LocalStandard => "LOCAL_STANDARD",
            Mode::LocalPrivileged => "LOCAL_PRIVILEGED",
        }
    }

    /// Whether this mode is at least as privileged as `required`.
    pub fn satisfies(self, required: Mode) -> bool {
        self.rank() >= required.rank()
    }
}

impl PartialOrd for Mode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Mode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode '{0}'")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}
