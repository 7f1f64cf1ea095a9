// src/deploy/apply.rs

//! Registering the manifest's deployments with the control plane.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use blake3::Hasher;
use tracing::info;

use crate::config::Settings;
use crate::errors::{FlowdeployError, Result};
use crate::exec::{CliCommand, CommandRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedManifest {
    /// BLAKE3 hex digest of the manifest that was applied.
    pub fingerprint: String,
    /// Whatever the CLI printed on success.
    pub output: String,
}

/// Apply every deployment in `settings.manifest`.
///
/// A missing manifest fails with [`FlowdeployError::ConfigError`] before
/// the runner is touched.
pub async fn apply_manifest<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &Settings,
) -> Result<AppliedManifest> {
    let manifest = &settings.manifest;
    if !manifest.exists() {
        return Err(FlowdeployError::ConfigError(format!(
            "deployment manifest {:?} not found",
            manifest.path()
        )));
    }

    let fingerprint = fingerprint(manifest.path())?;
    info!(manifest = ?manifest.path(), %fingerprint, "applying manifest");

    let cmd = CliCommand::ApplyManifest {
        manifest: manifest.clone(),
    }
    .prepare(settings);

    let output = runner.run(&cmd).await?.into_result(&cmd)?;

    Ok(AppliedManifest {
        fingerprint,
        output: output.stdout.trim().to_string(),
    })
}

/// BLAKE3 digest of a file's contents, hex-encoded.
pub fn fingerprint(path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file =
        File::open(path).with_context(|| format!("opening manifest for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
