//! # monohook
//!
//! Git hooks for polyglot Nx monorepos. Three pieces work together:
//!
//! - **Hook dispatcher**: classifies the files a hook sees and runs the Node,
//!   Python and .NET steps they call for.
//! - **Workspace repair**: keeps `nx.json`, `workspace.json` and the Nx cache
//!   artifacts usable without losing local edits or file encodings.
//! - **Safe runner**: wraps `nx run-many` so that a target with no matching
//!   projects does not fail the pipeline.
//!
//! ## Quick Start
//!
//! ```bash
//! # Install the hooks into .git/hooks
//! monohook install
//!
//! # Fix up Nx metadata after a messy merge
//! monohook repair
//!
//! # Run Python tests, tolerating an empty tag
//! monohook nx --target=test --projects=tag:python
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod git;
pub mod hooks;
pub mod repair;
pub mod runner;

pub use cli::{Cli, Output};
pub use config::MonohookConfig;
pub use error::{HookError, exit_code_for};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
