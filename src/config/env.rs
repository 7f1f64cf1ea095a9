// src/config/env.rs

//! Immutable snapshot of the process environment.
//!
//! Resolution never mutates the real process environment. The snapshot is
//! captured once at startup, optionally merged with a `.env` file, and then
//! only read. Resolved values reach child processes through
//! [`crate::exec::CommandSpec::env`], scoped to a single spawn.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::{FlowdeployError, Result};

pub const PROJECT_ROOT: &str = "PROJECT_ROOT";
pub const API_HOST: &str = "PREFECT_SERVER_API_HOST";
pub const API_PORT: &str = "PREFECT_SERVER_API_PORT";
pub const API_URL: &str = "PREFECT_API_URL";
pub const HOME: &str = "PREFECT_HOME";
pub const MANIFEST: &str = "FLOWDEPLOY_MANIFEST";

/// Location of the `.env` file, relative to the project root.
pub const ENV_FILE_PATH: &str = "config/.env";

#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
    cwd: PathBuf,
}

impl EnvSnapshot {
    /// Capture the current process environment and working directory.
    pub fn capture() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_vars(std::env::vars(), cwd)
    }

    pub fn from_vars<I, K, V>(vars: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            cwd: cwd.into(),
        }
    }

    /// Value of `key`, treating empty strings as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// `PROJECT_ROOT` if set (relative values resolve against the working
    /// directory), otherwise the working directory itself.
    pub fn project_root(&self) -> PathBuf {
        match self.get(PROJECT_ROOT) {
            Some(root) => self.cwd.join(root),
            None => self.cwd.clone(),
        }
    }

    /// Merge variables from a `.env`-style file.
    ///
    /// Variables already present in the snapshot win; the file only fills
    /// gaps. `PROJECT_ROOT` is never taken from the file: the file itself is
    /// located through the root. Returns the number of variables that were
    /// added.
    pub fn merge_env_file(&mut self, path: &Path) -> Result<usize> {
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            FlowdeployError::ConfigError(format!("reading env file {:?}: {e}", path))
        })?;

        let mut added = 0;
        for item in iter {
            let (key, value) = item.map_err(|e| {
                FlowdeployError::ConfigError(format!("parsing env file {:?}: {e}", path))
            })?;
            if key == PROJECT_ROOT {
                warn!(path = ?path, "ignoring PROJECT_ROOT set in env file");
                continue;
            }
            if self.vars.contains_key(&key) {
                debug!(%key, "env file entry shadowed by process environment");
                continue;
            }
            self.vars.insert(key, value);
            added += 1;
        }

        info!(path = ?path, added, "loaded env file");
        Ok(added)
    }
}
