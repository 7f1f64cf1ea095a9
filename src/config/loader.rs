// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::env::{ENV_FILE_PATH, EnvSnapshot};
use crate::config::model::{RawSettings, Settings};
use crate::config::resolve::resolve_settings;
use crate::errors::{FlowdeployError, Result};

/// Default settings file name, looked up in the project root.
pub const DEFAULT_SETTINGS_FILE: &str = "Flowdeploy.toml";

/// Load a settings file and return the raw, unvalidated `RawSettings`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawSettings = toml::from_str(&contents)?;

    Ok(raw)
}

/// Build the settings for this process.
///
/// - Captures the process environment.
/// - Merges `<project_root>/config/.env` into it, if present. The project
///   root is fixed before the merge.
/// - Reads the settings file: `explicit` must exist when given; the default
///   `<project_root>/Flowdeploy.toml` is optional.
/// - Resolves and validates everything into [`Settings`].
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    load_settings_with_env(explicit, EnvSnapshot::capture())
}

/// Same as [`load_settings`], with a caller-provided environment.
pub fn load_settings_with_env(explicit: Option<&Path>, mut env: EnvSnapshot) -> Result<Settings> {
    let project_root = env.project_root();

    let env_file = project_root.join(ENV_FILE_PATH);
    if env_file.is_file() {
        env.merge_env_file(&env_file)?;
    } else {
        debug!(path = ?env_file, "no env file found");
    }

    let raw = match explicit {
        Some(path) => {
            let path = env.cwd().join(path);
            if !path.is_file() {
                return Err(FlowdeployError::ConfigError(format!(
                    "settings file {:?} does not exist",
                    path
                )));
            }
            info!(path = ?path, "loading settings file");
            load_from_path(&path)?
        }
        None => {
            let path = default_settings_path(&project_root);
            if path.is_file() {
                info!(path = ?path, "loading settings file");
                load_from_path(&path)?
            } else {
                debug!(path = ?path, "no settings file; using defaults");
                RawSettings::default()
            }
        }
    };

    resolve_settings(raw, &env)
}

pub fn default_settings_path(project_root: &Path) -> PathBuf {
    project_root.join(DEFAULT_SETTINGS_FILE)
}
