// tests/real_runner.rs
//
// End-to-end runs against a stand-in CLI (`sh -c ...`), so real processes
// are spawned but no workflow tooling is needed.

#![cfg(unix)]

mod common;
use crate::common::{FakeCluster, Project, SettingsBuilder, init_tracing, with_timeout};

use std::fs;
use std::time::Duration;

use flowdeploy::deploy::{Driver, Step, Verdict, apply, worker};
use flowdeploy::errors::FlowdeployError;
use flowdeploy::exec::{CliCommand, RealCommandRunner};
use flowdeploy::service;

#[tokio::test]
async fn worker_output_lands_in_the_log_file() {
    init_tracing();

    let project = Project::new();
    let settings = SettingsBuilder::new(project.root())
        .cli_program("sh", &["-c", "echo started \"$@\"; echo to-stderr >&2", "cli"])
        .worker_log("logs/worker.log")
        .build();

    let process = worker::start_worker(&RealCommandRunner::new(), &settings).unwrap();
    assert!(process.pid > 0);
    assert_eq!(process.log_path, project.root().join("logs/worker.log"));

    let log = with_timeout(async {
        loop {
            let log = fs::read_to_string(&process.log_path).unwrap_or_default();
            if log.contains("to-stderr") {
                return log;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    assert!(
        log.contains("started worker start --pool default --name default-worker"),
        "log was:\n{log}"
    );
}

#[tokio::test]
async fn missing_worker_program_is_an_error() {
    init_tracing();

    let project = Project::new();
    let settings = SettingsBuilder::new(project.root())
        .cli_program("/definitely/not/a/flowdeploy/cli", &[])
        .build();

    assert!(worker::start_worker(&RealCommandRunner::new(), &settings).is_err());
}

#[tokio::test]
async fn apply_surfaces_cli_stderr() {
    init_tracing();

    let project = Project::new();
    let settings = SettingsBuilder::new(project.root())
        .cli_program("sh", &["-c", "echo 'bad entrypoint' >&2; exit 3", "cli"])
        .build();

    let err = apply::apply_manifest(&RealCommandRunner::new(), &settings)
        .await
        .unwrap_err();

    match err {
        FlowdeployError::ExternalCommand { code, stderr, .. } => {
            assert_eq!(code, 3);
            assert_eq!(stderr, "bad entrypoint");
        }
        other => panic!("expected external command error, got {other:?}"),
    }
}

#[tokio::test]
async fn apply_passes_manifest_and_api_url() {
    init_tracing();

    let project = Project::new();
    let settings = SettingsBuilder::new(project.root())
        .env("PREFECT_SERVER_API_PORT", "4300")
        .cli_program("sh", &["-c", "echo \"$PREFECT_API_URL\" \"$@\"", "cli"])
        .build();

    let applied = apply::apply_manifest(&RealCommandRunner::new(), &settings)
        .await
        .unwrap();

    let expected = format!(
        "http://127.0.0.1:4300/api deploy --all --prefect-file {}",
        project.root().join("prefect.yaml").display()
    );
    assert_eq!(applied.output, expected);
    assert_eq!(applied.fingerprint.len(), 64);
}

#[tokio::test]
async fn driver_with_real_cli_succeeds() {
    init_tracing();

    let project = Project::new();
    let settings = SettingsBuilder::new(project.root())
        .cli_program("sh", &["-c", "echo ok \"$@\"", "cli"])
        .build();
    let cluster = FakeCluster::new();

    let mut driver = Driver::new(&settings, cluster.clone(), RealCommandRunner::new(), Vec::new());
    let outcome = with_timeout(driver.run()).await;

    assert_eq!(outcome.verdict, Verdict::Success, "{outcome:?}");
    assert_eq!(outcome.step, Step::Done);
    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    // The control plane only answered listings; the CLI did the rest.
    assert!(cluster.commands().is_empty());
}

#[tokio::test]
async fn server_gets_its_home_directory() {
    init_tracing();

    let project = Project::new();
    let settings = project.settings();
    let cluster = FakeCluster::new();

    let exit = with_timeout(service::run_server(&cluster, &settings)).await.unwrap();

    assert_eq!(exit.exit_code(), 0);
    assert!(settings.server_home.is_dir());
    assert_eq!(
        cluster.commands(),
        vec![CliCommand::StartServer {
            host: "127.0.0.1".to_string(),
            port: 4200,
        }]
    );
}

#[tokio::test]
async fn attached_worker_reports_child_exit_code() {
    init_tracing();

    let project = Project::new();
    let settings = SettingsBuilder::new(project.root())
        .cli_program("sh", &["-c", "exit 4", "cli"])
        .build();

    let exit = with_timeout(service::run_worker(&RealCommandRunner::new(), &settings))
        .await
        .unwrap();

    assert_eq!(exit.code, Some(4));
    assert!(!exit.interrupted);
    assert_eq!(exit.exit_code(), 1);
}
