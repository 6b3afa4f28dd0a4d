//! scrivener CLI: fuzzy-search and content-extraction over a docs site's
//! detected format (Sphinx, MkDocs, or Pydoctor).
//!
//! All command implementations live under [`commands`], one module per
//! subcommand; [`cli`] defines the `clap` surface and [`output`] renders
//! results/errors in the requested [`cli::DisplayFormat`].

pub mod cli;
mod commands;
pub mod error;
mod logging;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use error::CliError;
use scrivener_core::Globals;
use std::process::ExitCode;

/// Parse arguments, initialize logging, dispatch to the selected subcommand,
/// and translate the result into an exit code: 0 success, 1 engine
/// error, 2 usage error.
pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = logging::initialize_logging(&cli) {
        eprintln!("failed to initialize logging: {error}");
        return ExitCode::from(error::ErrorCategory::Engine.exit_code());
    }

    match execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            error.as_exit_code()
        },
    }
}

async fn execute(cli: &Cli) -> Result<(), CliError> {
    let globals = Globals::with_builtins().map_err(error::CliError::engine)?;

    match cli.command.clone() {
        Commands::Detect { location, genus } => commands::detect_cmd::execute(cli, &globals, &location, genus).await,
        Commands::QueryInventory { location, term, filters, results_max, details } => {
            commands::query_inventory_cmd::execute(cli, &globals, &location, &term, &cli::filters_map(&filters), results_max, details).await
        },
        Commands::QueryContent { location, term, filters, results_max, lines_max, content_id, details } => {
            commands::query_content_cmd::execute(cli, &globals, &location, &term, &cli::filters_map(&filters), results_max, lines_max, content_id.as_deref(), details).await
        },
        Commands::SummarizeInventory { location, term, group_by } => {
            commands::summarize_inventory_cmd::execute(cli, &globals, &location, term.as_deref(), group_by.as_deref()).await
        },
        Commands::SurveyProcessors { processor_name } => commands::survey_processors_cmd::execute(cli, &globals, processor_name.as_deref()),
        Commands::Serve { transport, port, extra_functions } => commands::serve_cmd::execute(transport, port, extra_functions).await,
    }
}
