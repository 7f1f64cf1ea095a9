// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::{PoolKind, ResourcePool};

pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 4200;

/// Settings as read from `Flowdeploy.toml`.
///
/// ```toml
/// [api]
/// host = "127.0.0.1"
/// port = 4200
///
/// [pool]
/// name = "default"
/// kind = "process"
///
/// [deploy]
/// manifest = "src/prefect.yaml"
///
/// [cli]
/// program = "python3"
/// args = ["-m", "prefect"]
/// ```
///
/// Every section is optional. Environment variables take precedence over
/// the `[api]` and `[deploy]` values here.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSettings {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub pool: PoolSection,

    #[serde(default)]
    pub worker: WorkerSection,

    #[serde(default)]
    pub deploy: DeploySection,

    #[serde(default)]
    pub cli: CliSection,

    #[serde(default)]
    pub probe: ProbeSection,

    #[serde(default)]
    pub server: ServerSection,
}

/// `[api]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiSection {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Full API URL, e.g. `http://10.0.0.2:4200/api`. Wins over host/port.
    #[serde(default)]
    pub url: Option<String>,

    /// Request timeout for control-plane calls. Unset means the transport
    /// default (no explicit timeout).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `[pool]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSection {
    #[serde(default = "default_pool_name")]
    pub name: String,

    #[serde(default)]
    pub kind: PoolKind,
}

fn default_pool_name() -> String {
    "default".to_string()
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            name: default_pool_name(),
            kind: PoolKind::default(),
        }
    }
}

/// `[worker]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSection {
    /// Worker name; defaults to `<pool>-worker`.
    #[serde(default)]
    pub name: Option<String>,

    /// Where the detached worker writes its merged stdout/stderr.
    #[serde(default = "default_worker_log")]
    pub log_file: String,
}

fn default_worker_log() -> String {
    "worker.log".to_string()
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            name: None,
            log_file: default_worker_log(),
        }
    }
}

/// `[deploy]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeploySection {
    #[serde(default)]
    pub manifest: Option<String>,
}

pub const DEFAULT_MANIFEST: &str = "prefect.yaml";

/// `[cli]` section: how to invoke the external workflow CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct CliSection {
    #[serde(default = "default_cli_program")]
    pub program: String,

    /// Arguments placed before every subcommand.
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_cli_program() -> String {
    "prefect".to_string()
}

impl Default for CliSection {
    fn default() -> Self {
        Self {
            program: default_cli_program(),
            args: Vec::new(),
        }
    }
}

/// `[probe]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSection {
    /// Total readiness probes before giving up. 1 means single-shot.
    #[serde(default = "default_probe_attempts")]
    pub attempts: u32,

    /// Delay between probes.
    #[serde(default = "default_probe_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_probe_attempts() -> u32 {
    1
}

fn default_probe_backoff_ms() -> u64 {
    500
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            attempts: default_probe_attempts(),
            backoff_ms: default_probe_backoff_ms(),
        }
    }
}

/// `[server]` section, used by `flowdeploy server`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    /// Control-plane home directory (database, logs). Relative to the
    /// project root.
    #[serde(default = "default_server_home")]
    pub home: String,
}

fn default_server_home() -> String {
    "data".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            home: default_server_home(),
        }
    }
}

/// Where and how to reach the control-plane API.
///
/// Built once at startup and never changed. `base_url` is always of the
/// form `scheme://host:port/api`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    scheme: String,
    host: String,
    port: u16,
    base_url: String,
}

impl ConnectionTarget {
    pub(crate) fn new(scheme: &str, host: &str, port: u16) -> Self {
        let authority = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{port}")
        } else {
            format!("{host}:{port}")
        };
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
            base_url: format!("{scheme}://{authority}/api"),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the web UI served next to the API.
    pub fn ui_url(&self) -> &str {
        self.base_url.trim_end_matches("/api")
    }
}

impl Default for ConnectionTarget {
    fn default() -> Self {
        Self::new("http", DEFAULT_API_HOST, DEFAULT_API_PORT)
    }
}

/// The deployment manifest handed to the CLI.
///
/// Treated as opaque: the only thing checked is that it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentManifest {
    path: PathBuf,
}

impl DeploymentManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Directory the CLI runs in when applying the manifest.
    pub fn working_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// How to invoke the external CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliProgram {
    pub program: String,
    pub prefix_args: Vec<String>,
}

/// Bounded retry around the readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            attempts: default_probe_attempts(),
            backoff: Duration::from_millis(default_probe_backoff_ms()),
        }
    }
}

/// Fully resolved, validated settings.
///
/// Constructed once by [`crate::config::resolve_settings`] and passed by
/// reference to every component.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_root: PathBuf,
    pub target: ConnectionTarget,
    pub pool: ResourcePool,
    pub worker_name: String,
    pub worker_log: PathBuf,
    pub manifest: DeploymentManifest,
    pub cli: CliProgram,
    pub probe: ProbePolicy,
    pub api_timeout: Option<Duration>,
    pub server_home: PathBuf,
}
