// src/config/validate.rs

use crate::config::model::RawSettings;
use crate::errors::{FlowdeployError, Result};
use crate::types::PoolName;

/// Sanity checks that don't depend on the environment.
pub fn validate_raw_settings(raw: &RawSettings) -> Result<()> {
    validate_pool(raw)?;
    validate_worker(raw)?;
    validate_cli(raw)?;
    validate_probe(raw)?;
    Ok(())
}

fn validate_pool(raw: &RawSettings) -> Result<()> {
    PoolName::parse(&raw.pool.name)
        .map_err(|e| FlowdeployError::ConfigError(format!("[pool].name: {e}")))?;
    Ok(())
}

fn validate_worker(raw: &RawSettings) -> Result<()> {
    if let Some(name) = &raw.worker.name {
        if name.trim().is_empty() || name.starts_with('-') {
            return Err(FlowdeployError::ConfigError(format!(
                "[worker].name must be non-empty and not start with '-' (got {name:?})"
            )));
        }
    }
    if raw.worker.log_file.trim().is_empty() {
        return Err(FlowdeployError::ConfigError(
            "[worker].log_file must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_cli(raw: &RawSettings) -> Result<()> {
    if raw.cli.program.trim().is_empty() {
        return Err(FlowdeployError::ConfigError(
            "[cli].program must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_probe(raw: &RawSettings) -> Result<()> {
    if raw.probe.attempts == 0 {
        return Err(FlowdeployError::ConfigError(
            "[probe].attempts must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
