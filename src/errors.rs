// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowdeployError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Control plane unreachable: {0}")]
    Connectivity(String),

    #[error("`{command}` exited with code {code}: {stderr}")]
    ExternalCommand {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Resource already exists: {0}")]
    ResourceConflict(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowdeployError {
    /// Human-readable detail suitable for a status line.
    ///
    /// For external commands this is just the captured diagnostics, without
    /// the wrapping "exited with code" prefix.
    pub fn detail(&self) -> String {
        match self {
            FlowdeployError::ExternalCommand { stderr, code, .. } if !stderr.is_empty() => {
                format!("exit code {code}: {stderr}")
            }
            other => other.to_string(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FlowdeployError>;
