// src/deploy/worker.rs

//! Background worker supervision.

use std::path::PathBuf;

use tracing::info;

use crate::config::Settings;
use crate::errors::Result;
use crate::exec::{CliCommand, CommandRunner};
use crate::types::PoolName;

/// A worker started by this run.
///
/// Only a record: the process belongs to nobody once spawned and keeps
/// running after flowdeploy exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerProcess {
    pub pool: PoolName,
    pub worker_name: String,
    pub log_path: PathBuf,
    pub pid: u32,
}

/// Start a detached worker bound to the configured pool, logging to
/// `settings.worker_log`.
pub fn start_worker<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &Settings,
) -> Result<WorkerProcess> {
    let cmd = CliCommand::StartWorker {
        pool: settings.pool.name.clone(),
        worker_name: settings.worker_name.clone(),
    }
    .prepare(settings);

    let process = runner.spawn_detached(&cmd, &settings.worker_log)?;

    info!(
        pool = %settings.pool.name,
        worker = %settings.worker_name,
        pid = process.pid,
        log = ?process.log_path,
        "worker started in background"
    );

    Ok(WorkerProcess {
        pool: settings.pool.name.clone(),
        worker_name: settings.worker_name.clone(),
        log_path: process.log_path,
        pid: process.pid,
    })
}
