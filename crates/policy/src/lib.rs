//! Runtime capability policy gate.
//!
//! Core principle: **no side-effecting operation runs until the gate says so.**
//!
//! The gate answers one question: may this runtime run this operation in this
//! mode? It is a pure function of three declarative tables and the request.
//!
//! # Tables
//!
//! - [`CapabilityMatrix`] — the boolean flags each [`Mode`] grants.
//! - [`RuntimeTable`] — each runtime's default mode and allowed modes.
//! - [`OperationTable`] — each operation's minimum mode and required flags.
//!
//! [`Policy::load`] reads all three and fails with
//! [`Error::ConfigurationMissing`] or [`Error::ConfigurationInvalid`] before
//! any decision is made.
//!
//! # Example
//!
//! ```no_run
//! use policy::{GateRequest, Policy};
//!
//! let policy = Policy::load_dir("config")?;
//! let verdict = policy.check(&GateRequest::new("square_cache_sync", "local_cli"));
//! if !verdict.is_allowed() {
//!     eprintln!("{verdict}");
//!     std::process::exit(verdict.exit_status().code());
//! }
//! # Ok::<(), policy::Error>(())
//! ```

mod capability;
mod error;
pub mod lint;
mod mode;
mod operation;
mod policy;
mod runtime;
mod verdict;

pub use capability::{Capabilities, CapabilityMatrix};
pub use error::{Error, Result, SchemaError};
pub use mode::{Mode, UnknownMode};
pub use operation::{OperationPolicy, OperationTable};
pub use policy::{
    CAPABILITIES_FILE, GateRequest, OPERATIONS_FILE, Policy, RUNTIMES_FILE, TablePaths,
};
pub use runtime::{RuntimeProfile, RuntimeTable};
pub use verdict::{Denial, ExitStatus, FailureCategory, Grant, Verdict};
