// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] builds typed CLI invocations (`CliCommand` →
//!   `PreparedCommand`) from resolved settings.
//! - [`backend`] provides the `CommandRunner` trait and the production
//!   `RealCommandRunner`; tests swap in a fake.
//! - [`detached`] starts fire-and-forget background processes whose output
//!   goes to a log file.

pub mod backend;
pub mod command;
pub mod detached;

pub use backend::{CommandOutput, CommandRunner, DetachedProcess, RealCommandRunner};
pub use command::{CliCommand, CommandSpec, PreparedCommand};
