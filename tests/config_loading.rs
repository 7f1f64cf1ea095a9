// tests/config_loading.rs

mod common;
use crate::common::{Project, init_tracing};

use std::path::Path;

use flowdeploy::config::{EnvSnapshot, load_settings_with_env};
use flowdeploy::errors::FlowdeployError;
use flowdeploy::types::PoolKind;

fn env_in(root: &Path, vars: &[(&str, &str)]) -> EnvSnapshot {
    EnvSnapshot::from_vars(vars.iter().copied(), root)
}

#[test]
fn defaults_without_any_files() {
    init_tracing();
    let project = Project::new();

    let settings = load_settings_with_env(None, env_in(project.root(), &[])).unwrap();

    assert_eq!(settings.project_root, project.root());
    assert_eq!(settings.target.base_url(), "http://127.0.0.1:4200/api");
    assert_eq!(settings.pool.name.as_str(), "default");
    assert_eq!(settings.pool.kind, PoolKind::Process);
    assert_eq!(settings.worker_name, "default-worker");
    assert_eq!(settings.worker_log, project.root().join("worker.log"));
    assert_eq!(settings.manifest.path(), project.root().join("prefect.yaml"));
    assert!(settings.manifest.exists());
    assert_eq!(settings.probe.attempts, 1);
}

#[test]
fn toml_then_env_file_then_process_env() {
    init_tracing();
    let project = Project::new();
    project.write(
        "Flowdeploy.toml",
        r#"
[api]
host = "toml-host"
port = 5000

[pool]
name = "etl"
kind = "docker"

[worker]
log_file = "logs/worker.log"

[probe]
attempts = 3
backoff_ms = 10
"#,
    );
    project.write(
        "config/.env",
        "PREFECT_SERVER_API_HOST=dotenv-host\nPREFECT_SERVER_API_PORT=6000\n",
    );

    // Process env beats .env for the port only.
    let settings = load_settings_with_env(
        None,
        env_in(project.root(), &[("PREFECT_SERVER_API_PORT", "7000")]),
    )
    .unwrap();

    assert_eq!(settings.target.base_url(), "http://dotenv-host:7000/api");
    assert_eq!(settings.pool.name.as_str(), "etl");
    assert_eq!(settings.pool.kind, PoolKind::Docker);
    assert_eq!(settings.worker_name, "etl-worker");
    assert_eq!(settings.worker_log, project.root().join("logs/worker.log"));
    assert_eq!(settings.probe.attempts, 3);
}

#[test]
fn env_file_can_override_the_whole_url() {
    init_tracing();
    let project = Project::new();
    project.write("config/.env", "PREFECT_API_URL=https://prefect.internal/api\n");

    let settings = load_settings_with_env(None, env_in(project.root(), &[])).unwrap();

    assert_eq!(settings.target.scheme(), "https");
    assert_eq!(settings.target.host(), "prefect.internal");
    assert_eq!(settings.target.base_url(), "https://prefect.internal:4200/api");
}

#[test]
fn env_file_does_not_relocate_the_project() {
    init_tracing();
    let project = Project::new();
    let elsewhere = Project::new();
    project.write("Flowdeploy.toml", "[pool]\nname = \"etl\"\n");
    project.write(
        "config/.env",
        &format!("PROJECT_ROOT={}\n", elsewhere.root().display()),
    );

    let settings = load_settings_with_env(None, env_in(project.root(), &[])).unwrap();

    assert_eq!(settings.pool.name.as_str(), "etl");
    assert_eq!(settings.project_root, project.root());
    assert_eq!(settings.manifest.path(), project.root().join("prefect.yaml"));
    assert_eq!(settings.worker_log, project.root().join("worker.log"));
}

#[test]
fn manifest_env_var_wins_over_file() {
    init_tracing();
    let project = Project::new();
    project.write("Flowdeploy.toml", "[deploy]\nmanifest = \"deploy/a.yaml\"\n");

    let settings = load_settings_with_env(
        None,
        env_in(project.root(), &[("FLOWDEPLOY_MANIFEST", "deploy/b.yaml")]),
    )
    .unwrap();

    assert_eq!(settings.manifest.path(), project.root().join("deploy/b.yaml"));
    assert!(!settings.manifest.exists());
}

#[test]
fn explicit_settings_file_must_exist() {
    init_tracing();
    let project = Project::new();

    let err = load_settings_with_env(
        Some(Path::new("missing.toml")),
        env_in(project.root(), &[]),
    )
    .unwrap_err();

    assert!(matches!(err, FlowdeployError::ConfigError(_)), "got {err:?}");
}

#[test]
fn explicit_settings_file_is_relative_to_cwd() {
    init_tracing();
    let project = Project::new();
    project.write("conf/staging.toml", "[pool]\nname = \"staging\"\n");

    let settings = load_settings_with_env(
        Some(Path::new("conf/staging.toml")),
        env_in(project.root(), &[]),
    )
    .unwrap();

    assert_eq!(settings.pool.name.as_str(), "staging");
}

#[test]
fn invalid_settings_are_rejected() {
    init_tracing();

    for contents in [
        "[pool]\nname = \"\"\n",
        "[pool]\nname = \"bad name\"\n",
        "[probe]\nattempts = 0\n",
        "[cli]\nprogram = \"\"\n",
    ] {
        let project = Project::new();
        project.write("Flowdeploy.toml", contents);

        let err = load_settings_with_env(None, env_in(project.root(), &[])).unwrap_err();
        assert!(
            matches!(err, FlowdeployError::ConfigError(_)),
            "{contents:?} gave {err:?}"
        );
    }
}

#[test]
fn malformed_toml_is_a_toml_error() {
    init_tracing();
    let project = Project::new();
    project.write("Flowdeploy.toml", "[pool\nname = ");

    let err = load_settings_with_env(None, env_in(project.root(), &[])).unwrap_err();
    assert!(matches!(err, FlowdeployError::TomlError(_)), "got {err:?}");
}
