use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static POOL_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("pool name regex is valid")
});

/// Name of a worker pool on the control plane.
///
/// Identity of a pool is its name, compared case-sensitively. Names are
/// validated on construction so that nothing unexpected ever reaches a
/// spawned command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolName(String);

impl PoolName {
    pub fn parse(s: &str) -> Result<Self, String> {
        if POOL_NAME_RE.is_match(s) {
            Ok(PoolName(s.to_string()))
        } else {
            Err(format!(
                "invalid pool name {s:?} (expected letters, digits, '.', '_' or '-', not starting with a symbol)"
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name given to the worker bound to this pool when none is configured.
    pub fn default_worker_name(&self) -> String {
        format!("{}-worker", self.0)
    }
}

impl fmt::Display for PoolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Infrastructure type of a worker pool (`--type` on the CLI).
///
/// Unknown kinds are passed through verbatim; the control plane owns the
/// list of what it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PoolKind {
    Process,
    Docker,
    Kubernetes,
    Other(String),
}

impl Default for PoolKind {
    fn default() -> Self {
        PoolKind::Process
    }
}

impl PoolKind {
    pub fn as_str(&self) -> &str {
        match self {
            PoolKind::Process => "process",
            PoolKind::Docker => "docker",
            PoolKind::Kubernetes => "kubernetes",
            PoolKind::Other(s) => s,
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Err("pool kind must not be empty".to_string()),
            "process" => Ok(PoolKind::Process),
            "docker" => Ok(PoolKind::Docker),
            "kubernetes" => Ok(PoolKind::Kubernetes),
            _ => Ok(PoolKind::Other(trimmed.to_string())),
        }
    }
}

impl TryFrom<String> for PoolKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A named execution pool the orchestrator must ensure exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePool {
    pub name: PoolName,
    pub kind: PoolKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_names_are_validated() {
        assert!(PoolName::parse("default").is_ok());
        assert!(PoolName::parse("etl-pool_2.a").is_ok());
        assert!(PoolName::parse("").is_err());
        assert!(PoolName::parse("-flag").is_err());
        assert!(PoolName::parse("has space").is_err());
        assert!(PoolName::parse("a/b").is_err());
    }

    #[test]
    fn pool_kind_parses_known_and_passes_through_unknown() {
        assert_eq!("Process".parse::<PoolKind>(), Ok(PoolKind::Process));
        assert_eq!(" docker ".parse::<PoolKind>(), Ok(PoolKind::Docker));
        assert_eq!(
            "ecs".parse::<PoolKind>(),
            Ok(PoolKind::Other("ecs".to_string()))
        );
        assert_eq!(
            " Cloud-Run:v2 ".parse::<PoolKind>(),
            Ok(PoolKind::Other("Cloud-Run:v2".to_string()))
        );
        assert!("".parse::<PoolKind>().is_err());
    }

    #[test]
    fn default_worker_name_derives_from_pool() {
        let pool = PoolName::parse("default").unwrap();
        assert_eq!(pool.default_worker_name(), "default-worker");
    }
}
