//! Console logging on stderr.
//!
//! stdout is reserved for the plugin handshake line and `--print-config`.
//! The filter comes from `RUST_LOG` when set, otherwise from `logging.level`
//! raised by the CLI verbosity flags.

use std::io::IsTerminal;

use anyhow::Context;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingConfig};

fn verbosity_level(verbose: u8) -> Option<(LevelFilter, &'static str)> {
    match verbose {
        0 => None,
        1 => Some((LevelFilter::INFO, "info")),
        2 => Some((LevelFilter::DEBUG, "debug")),
        _ => Some((LevelFilter::TRACE, "trace")),
    }
}

/// Filter directives for `logging.level` raised to the given verbosity
/// (`-v` info, `-vv` debug, `-vvv` trace).
///
/// Only the default level is raised, never lowered. Per-target directives
/// such as `courses=debug` are kept as configured.
#[must_use]
pub fn effective_level(cfg: &LoggingConfig, verbose: u8) -> String {
    let Some((floor, floor_name)) = verbosity_level(verbose) else {
        return cfg.level.clone();
    };

    let mut has_default = false;
    let mut directives: Vec<&str> = cfg
        .level
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|directive| match directive.parse::<LevelFilter>() {
            Ok(level) => {
                has_default = true;
                if level >= floor { directive } else { floor_name }
            }
            Err(_) => directive,
        })
        .collect();
    if !has_default {
        directives.insert(0, floor_name);
    }
    directives.join(",")
}

/// Install the global subscriber.
///
/// # Errors
/// Returns an error if the filter directive is invalid or a global
/// subscriber is already installed.
pub fn init_logging(cfg: &LoggingConfig, verbose: u8) -> anyhow::Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid RUST_LOG '{directives}'"))?,
        _ => {
            let level = effective_level(cfg, verbose);
            EnvFilter::try_new(&level).with_context(|| format!("invalid log level '{level}'"))?
        }
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match cfg.format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Text => builder
            .with_ansi(std::io::stderr().is_terminal())
            .try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
