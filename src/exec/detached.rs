// src/exec/detached.rs

//! Fire-and-forget background processes.

use std::fs::{self, File};
use std::path::Path;
use std::process::Stdio;

use anyhow::Context;
use tracing::info;

use crate::errors::Result;

use super::backend::DetachedProcess;
use super::command::CommandSpec;

/// Spawn `spec` in its own process group with stdout and stderr merged
/// into `log_path` (created or truncated).
///
/// The returned handle only carries the pid: the `Child` is dropped right
/// away, so the process is never waited on or killed by us and keeps
/// running after we exit.
pub fn spawn_detached(spec: &CommandSpec, log_path: &Path) -> Result<DetachedProcess> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {:?}", parent))?;
        }
    }

    let log = File::create(log_path).with_context(|| format!("creating log file {:?}", log_path))?;
    let log_stderr = log
        .try_clone()
        .with_context(|| format!("cloning log file handle {:?}", log_path))?;

    let mut cmd = spec.to_std();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_stderr));
    detach(&mut cmd);

    let child = cmd
        .spawn()
        .with_context(|| format!("spawning detached `{spec}`"))?;
    let pid = child.id();
    drop(child);

    info!(pid, cmd = %spec, log = ?log_path, "detached process started");

    Ok(DetachedProcess {
        pid,
        log_path: log_path.to_path_buf(),
    })
}

#[cfg(unix)]
fn detach(cmd: &mut std::process::Command) {
    use std::os::unix::process::CommandExt;
    // New process group: terminal signals aimed at us (Ctrl-C) skip the child.
    // It stays in our session, so a hangup of the controlling terminal can
    // still reach it; `setsid` would need a raw `pre_exec` hook.
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut std::process::Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut std::process::Command) {}
