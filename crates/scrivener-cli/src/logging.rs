//! Logging initialization (`--log-file`, `--log-level`).

use crate::cli::{Cli, DisplayFormat, LogLevel};
use anyhow::Result;
use colored::control as color_control;
use std::fs::OpenOptions;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

impl LogLevel {
    const fn as_tracing_level(self) -> Level {
        match self {
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }
}

/// Initialize the logging subsystem based on CLI flags.
///
/// JSON display output suppresses info-level logs so stdout stays clean for
/// machine consumption, unless `--log-level debug` was explicitly requested.
/// `--log-file` redirects logs away from stderr entirely.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set, or if
/// `--log-file` cannot be opened for append.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let mut level = cli.log_level.as_tracing_level();
    let machine_output = cli.display_format == DisplayFormat::Json;
    if machine_output && !matches!(cli.log_level, LogLevel::Debug) {
        level = Level::ERROR;
    }

    let builder = FmtSubscriber::builder().with_max_level(level).with_target(false).with_thread_ids(false).with_thread_names(false);

    if let Some(path) = &cli.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::subscriber::set_global_default(builder.with_writer(file).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())?;
    }

    let env_no_color = std::env::var("NO_COLOR").is_ok();
    if machine_output || env_no_color {
        color_control::set_override(false);
    }
    Ok(())
}
