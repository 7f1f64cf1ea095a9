// src/deploy/plan.rs

use std::io::{self, Write};

use tracing::debug;

use crate::config::Settings;
use crate::exec::CliCommand;

use super::Step;

/// Dry-run output: resolved settings and the command behind each step.
pub fn print_plan(settings: &Settings, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "flowdeploy dry-run")?;
    writeln!(out, "  project_root = {}", settings.project_root.display())?;
    writeln!(out, "  api          = {}", settings.target.base_url())?;
    writeln!(
        out,
        "  pool         = {} (type {})",
        settings.pool.name, settings.pool.kind
    )?;
    writeln!(out, "  worker       = {}", settings.worker_name)?;
    writeln!(out, "  worker_log   = {}", settings.worker_log.display())?;
    writeln!(
        out,
        "  manifest     = {}{}",
        settings.manifest.path().display(),
        if settings.manifest.exists() { "" } else { " (missing)" }
    )?;
    writeln!(
        out,
        "  probe        = {} attempt(s), {:?} apart",
        settings.probe.attempts, settings.probe.backoff
    )?;
    writeln!(out)?;

    writeln!(out, "steps ({}):", Step::SEQUENCE.len())?;
    for step in Step::SEQUENCE {
        let n = step.ordinal().unwrap_or_default();
        writeln!(out, "  {n}. {step}")?;
        match step {
            Step::CheckingReady => {
                writeln!(out, "      POST {}/work_pools/filter", settings.target.base_url())?;
            }
            Step::ReconcilingPool => {
                let cmd = CliCommand::CreatePool {
                    pool: settings.pool.clone(),
                }
                .prepare(settings);
                writeln!(out, "      {cmd}")?;
                writeln!(out, "      (only if '{}' is not listed)", settings.pool.name)?;
            }
            Step::StartingWorker => {
                let cmd = CliCommand::StartWorker {
                    pool: settings.pool.name.clone(),
                    worker_name: settings.worker_name.clone(),
                }
                .prepare(settings);
                writeln!(out, "      {cmd}")?;
                writeln!(out, "      (detached, output to {})", settings.worker_log.display())?;
            }
            Step::ApplyingManifest => {
                let cmd = CliCommand::ApplyManifest {
                    manifest: settings.manifest.clone(),
                }
                .prepare(settings);
                writeln!(out, "      {cmd}")?;
                if let Some(cwd) = &cmd.spec.cwd {
                    writeln!(out, "      (in {})", cwd.display())?;
                }
            }
            Step::ReportingResults => {
                let cmd = CliCommand::ListDeployments.prepare(settings);
                writeln!(out, "      {cmd}")?;
            }
            Step::Done => {}
        }
    }

    debug!("dry-run complete (nothing executed)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvSnapshot, RawSettings, resolve_settings};

    #[test]
    fn plan_lists_every_step_with_its_command() {
        let env = EnvSnapshot::from_vars([("PROJECT_ROOT", "/nonexistent/proj")], "/");
        let settings = resolve_settings(RawSettings::default(), &env).unwrap();

        let mut buf = Vec::new();
        print_plan(&settings, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        for step in Step::SEQUENCE {
            assert!(text.contains(&step.to_string()), "missing {step} in:\n{text}");
        }
        assert!(text.contains("prefect work-pool create default --type process"));
        assert!(text.contains("prefect worker start --pool default --name default-worker"));
        assert!(text.contains("prefect deployment ls"));
        assert!(text.contains("(missing)"));
    }
}
