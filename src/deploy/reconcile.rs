// src/deploy/reconcile.rs

//! Idempotent get-or-create of the work pool.

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::control_plane::ControlPlane;
use crate::errors::{FlowdeployError, Result};
use crate::exec::{CliCommand, CommandRunner};
use crate::types::PoolName;

/// State of the pool after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub exists: bool,
    /// `true` only if this call created the pool.
    pub created: bool,
}

/// Make sure `settings.pool` exists on the control plane.
///
/// Lists pools first and compares names exactly; only an absent pool is
/// created. If the listing itself fails, creation is attempted anyway. A
/// create rejected because the pool already exists (another run got there
/// first) counts as success.
pub async fn ensure_pool<C, R>(
    control_plane: &C,
    runner: &R,
    settings: &Settings,
) -> Result<PoolState>
where
    C: ControlPlane + ?Sized,
    R: CommandRunner + ?Sized,
{
    let name = &settings.pool.name;

    match control_plane.list_pools().await {
        Ok(pools) if pools.iter().any(|p| p.name == name.as_str()) => {
            info!(pool = %name, "work pool already exists");
            return Ok(PoolState {
                exists: true,
                created: false,
            });
        }
        Ok(pools) => {
            debug!(pool = %name, known = pools.len(), "work pool absent");
        }
        Err(e) => {
            warn!(pool = %name, error = %e, "could not list work pools; trying to create");
        }
    }

    let cmd = CliCommand::CreatePool {
        pool: settings.pool.clone(),
    }
    .prepare(settings);

    let result = runner
        .run(&cmd)
        .await?
        .into_result(&cmd)
        .map_err(|e| classify_conflict(e, name));

    match result {
        Ok(_) => {
            info!(pool = %name, kind = %settings.pool.kind, "work pool created");
            Ok(PoolState {
                exists: true,
                created: true,
            })
        }
        Err(FlowdeployError::ResourceConflict(_)) => {
            info!(pool = %name, "work pool was created concurrently; reusing it");
            Ok(PoolState {
                exists: true,
                created: false,
            })
        }
        Err(e) => Err(e),
    }
}

fn classify_conflict(err: FlowdeployError, name: &PoolName) -> FlowdeployError {
    match err {
        FlowdeployError::ExternalCommand { ref stderr, .. } if is_conflict(stderr) => {
            FlowdeployError::ResourceConflict(name.to_string())
        }
        other => other,
    }
}

fn is_conflict(diagnostic: &str) -> bool {
    diagnostic.to_lowercase().contains("already exists")
}
