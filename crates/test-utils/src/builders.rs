#![allow(dead_code)]

use std::path::{Path, PathBuf};

use flowdeploy::config::{EnvSnapshot, RawSettings, Settings, resolve_settings};
use flowdeploy::types::PoolKind;

/// Builder for `Settings` rooted in a test directory.
///
/// Goes through the real resolution path, so defaults and validation are
/// the production ones.
pub struct SettingsBuilder {
    raw: RawSettings,
    vars: Vec<(String, String)>,
    cwd: PathBuf,
}

impl SettingsBuilder {
    /// Settings whose project root is `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            raw: RawSettings::default(),
            vars: vec![("PROJECT_ROOT".to_string(), root.display().to_string())],
            cwd: root,
        }
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.vars.push((key.to_string(), value.to_string()));
        self
    }

    pub fn pool(mut self, name: &str) -> Self {
        self.raw.pool.name = name.to_string();
        self
    }

    pub fn pool_kind(mut self, kind: PoolKind) -> Self {
        self.raw.pool.kind = kind;
        self
    }

    pub fn manifest(mut self, path: &str) -> Self {
        self.raw.deploy.manifest = Some(path.to_string());
        self
    }

    pub fn worker_log(mut self, path: &str) -> Self {
        self.raw.worker.log_file = path.to_string();
        self
    }

    pub fn probe(mut self, attempts: u32, backoff_ms: u64) -> Self {
        self.raw.probe.attempts = attempts;
        self.raw.probe.backoff_ms = backoff_ms;
        self
    }

    pub fn cli_program(mut self, program: &str, args: &[&str]) -> Self {
        self.raw.cli.program = program.to_string();
        self.raw.cli.args = args.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build(self) -> Settings {
        let env = EnvSnapshot::from_vars(self.vars, self.cwd);
        resolve_settings(self.raw, &env).expect("Failed to build valid settings from builder")
    }
}
