// src/config/mod.rs

//! Settings resolution for flowdeploy.
//!
//! Responsibilities:
//! - Snapshot the process environment and merge the `.env` file (`env.rs`).
//! - Define the TOML-backed data model and resolved types (`model.rs`).
//! - Load the settings file from disk (`loader.rs`).
//! - Validate it and resolve it against the environment (`validate.rs`,
//!   `resolve.rs`).

pub mod env;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod validate;

pub use env::EnvSnapshot;
pub use loader::{load_from_path, load_settings, load_settings_with_env};
pub use model::{
    ApiSection, CliProgram, ConnectionTarget, DeploymentManifest, ProbePolicy, RawSettings,
    Settings,
};
pub use resolve::{resolve_settings, resolve_target};
pub use validate::validate_raw_settings;
