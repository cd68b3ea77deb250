//! External collaborators
//!
//! Process execution, Python environments and package managers. monohook
//! depends on these tools only through their exit codes.

pub mod package_managers;
pub mod process;
pub mod python;

pub use process::{CommandInvocationResult, CommandSpec, ProcessRunner, SystemRunner};
pub use python::{Platform, PythonEnv, VenvStatus};
