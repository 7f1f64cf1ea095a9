// src/config/resolve.rs

//! Turn raw settings + environment into the immutable [`Settings`].

use std::net::IpAddr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;
use tracing::{debug, warn};

use crate::config::env::{self, EnvSnapshot};
use crate::config::model::{
    ApiSection, CliProgram, ConnectionTarget, DEFAULT_API_HOST, DEFAULT_API_PORT,
    DEFAULT_MANIFEST, DeploymentManifest, ProbePolicy, RawSettings, Settings,
};
use crate::config::validate::validate_raw_settings;
use crate::errors::{FlowdeployError, Result};
use crate::types::{PoolName, ResourcePool};

static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)*$")
        .expect("hostname regex is valid")
});

/// Resolve settings against an environment snapshot.
///
/// Precedence, lowest first: built-in defaults, the TOML file, the `.env`
/// file, the process environment. The last two are already merged in `env`.
pub fn resolve_settings(raw: RawSettings, env: &EnvSnapshot) -> Result<Settings> {
    validate_raw_settings(&raw)?;

    let project_root = env.project_root();
    let target = resolve_target(&raw.api, env);

    let name = PoolName::parse(&raw.pool.name)
        .map_err(|e| FlowdeployError::ConfigError(format!("[pool].name: {e}")))?;
    let worker_name = raw
        .worker
        .name
        .clone()
        .unwrap_or_else(|| name.default_worker_name());
    let pool = ResourcePool {
        name,
        kind: raw.pool.kind,
    };

    let manifest = env
        .get(env::MANIFEST)
        .map(str::to_string)
        .or(raw.deploy.manifest)
        .unwrap_or_else(|| DEFAULT_MANIFEST.to_string());

    let settings = Settings {
        worker_log: project_root.join(raw.worker.log_file),
        manifest: DeploymentManifest::new(project_root.join(manifest)),
        server_home: project_root.join(raw.server.home),
        project_root,
        target,
        pool,
        worker_name,
        cli: CliProgram {
            program: raw.cli.program,
            prefix_args: raw.cli.args,
        },
        probe: ProbePolicy {
            attempts: raw.probe.attempts,
            backoff: Duration::from_millis(raw.probe.backoff_ms),
        },
        api_timeout: raw.api.timeout_secs.map(Duration::from_secs),
    };

    debug!(?settings, "resolved settings");
    Ok(settings)
}

/// Derive the control-plane connection target.
///
/// A full URL (`PREFECT_API_URL`, then `[api].url`) wins when it parses;
/// host or port missing from it fall back to the individually resolved
/// values. Anything malformed is logged and replaced by a default, so the
/// result is always usable.
pub fn resolve_target(api: &ApiSection, env: &EnvSnapshot) -> ConnectionTarget {
    let host = pick_host(env.get(env::API_HOST), api.host.as_deref());
    let port = pick_port(env.get(env::API_PORT), api.port);

    let override_url = env.get(env::API_URL).or_else(|| {
        api.url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    });

    if let Some(raw_url) = override_url {
        match parse_override(raw_url) {
            Ok((scheme, url_host, url_port)) => {
                let host = url_host.unwrap_or(host);
                return ConnectionTarget::new(&scheme, &host, url_port.unwrap_or(port));
            }
            Err(reason) => {
                warn!(url = %raw_url, %reason, "ignoring malformed API URL override");
            }
        }
    }

    ConnectionTarget::new("http", &host, port)
}

fn pick_host(from_env: Option<&str>, from_file: Option<&str>) -> String {
    for candidate in [from_env, from_file].into_iter().flatten() {
        match sanitize_host(candidate) {
            Some(host) => return host,
            None => warn!(host = %candidate, "ignoring invalid API host"),
        }
    }
    DEFAULT_API_HOST.to_string()
}

fn pick_port(from_env: Option<&str>, from_file: Option<u16>) -> u16 {
    if let Some(raw) = from_env {
        match raw.parse::<u16>() {
            Ok(port) if port != 0 => return port,
            _ => warn!(port = %raw, "ignoring invalid API port"),
        }
    }
    match from_file {
        Some(0) => {
            warn!("ignoring [api].port = 0");
            DEFAULT_API_PORT
        }
        Some(port) => port,
        None => DEFAULT_API_PORT,
    }
}

/// Accept IP literals (optionally bracketed) and plain DNS names only.
fn sanitize_host(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let unbracketed = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    let host = if let Ok(ip) = unbracketed.parse::<IpAddr>() {
        ip.to_string()
    } else if HOSTNAME_RE.is_match(unbracketed) {
        unbracketed.to_string()
    } else {
        return None;
    };

    // Some dotted-numeric names pass the regex but are not valid hosts.
    let candidate = ConnectionTarget::new("http", &host, DEFAULT_API_PORT);
    Url::parse(candidate.base_url()).ok().map(|_| host)
}

fn parse_override(raw: &str) -> std::result::Result<(String, Option<String>, Option<u16>), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(format!("unsupported scheme {scheme:?}"));
    }

    let host = match url.host_str() {
        Some(h) => Some(sanitize_host(h).ok_or_else(|| format!("unsupported host {h:?}"))?),
        None => None,
    };
    // `Url` hides a port equal to the scheme default; a written `:443` still counts.
    let port = if has_explicit_port(raw) {
        url.port_or_known_default()
    } else {
        None
    }
    .filter(|p| *p != 0);

    Ok((scheme.to_string(), host, port))
}

/// Whether the authority of `raw` spells out a port.
fn has_explicit_port(raw: &str) -> bool {
    let Some((_, rest)) = raw.trim().split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let after_host = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };
    after_host
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty())
}
