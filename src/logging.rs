// src/logging.rs

//! Diagnostics for `flowdeploy`, on stderr.
//!
//! Stdout belongs to the operator status lines and to whatever the external
//! CLI prints, so tracing output never goes there.
//!
//! The filter is chosen in this order:
//! 1. `--log-level`
//! 2. `FLOWDEPLOY_LOG`: either a plain level (`debug`) or full filter
//!    directives (`flowdeploy=debug,reqwest=info`)
//! 3. `info`
//!
//! For plain levels the HTTP client stack is capped at `warn`; its connection
//! chatter drowns out the deployment steps otherwise.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding a level or filter directives.
pub const LOG_ENV: &str = "FLOWDEPLOY_LOG";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let from_env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, from_env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn build_filter(cli_level: Option<LogLevel>, from_env: Option<&str>) -> EnvFilter {
    let from_env = from_env.map(str::trim).filter(|s| !s.is_empty());

    let directives = match (cli_level, from_env) {
        (Some(lvl), _) => level_directives(level_from_log_level(lvl)),
        (None, Some(raw)) => match parse_level_str(raw) {
            Some(level) => level_directives(level),
            None => raw.to_string(),
        },
        (None, None) => level_directives(Level::INFO),
    };

    EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        // The subscriber isn't up yet.
        eprintln!("flowdeploy: ignoring {LOG_ENV}={directives:?} ({e}); logging at info");
        EnvFilter::new(level_directives(Level::INFO))
    })
}

fn level_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("{level},hyper=warn,hyper_util=warn,reqwest=warn")
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_strings_are_case_insensitive() {
        assert_eq!(parse_level_str(" WARNING "), Some(Level::WARN));
        assert_eq!(parse_level_str("trace"), Some(Level::TRACE));
        assert_eq!(parse_level_str("loud"), None);
    }

    #[test]
    fn cli_flag_beats_env() {
        let filter = build_filter(Some(LogLevel::Debug), Some("error"));
        assert!(filter.to_string().contains("debug"), "{filter}");
    }

    #[test]
    fn env_directives_pass_through() {
        let filter = build_filter(None, Some("flowdeploy=trace,reqwest=info"));
        let text = filter.to_string();
        assert!(text.contains("flowdeploy=trace"), "{text}");
        assert!(!text.contains("hyper=warn"), "{text}");
    }

    #[test]
    fn plain_levels_quiet_the_http_stack() {
        let text = build_filter(None, Some("debug")).to_string();
        assert!(text.contains("hyper=warn"), "{text}");
        assert!(text.contains("reqwest=warn"), "{text}");
    }

    #[test]
    fn unusable_env_value_falls_back_to_info() {
        let text = build_filter(None, Some("flowdeploy=[[")).to_string();
        assert!(text.contains("info"), "{text}");
    }
}
