//! `query-inventory LOCATION TERM [--filters k=v...] [--results-max N] [--details ...]`.

use crate::cli::{Cli, DetailsArg};
use crate::error::{CliError, IntoCliError};
use crate::output::print_result;
use scrivener_core::Globals;
use scrivener_core::search::SearchMode;
use std::collections::HashMap;

/// Run `query-inventory`.
///
/// # Errors
///
/// Returns a [`CliError`] (exit code 1) if no inventory processor qualifies
/// or the qualified processor's fetch/parse fails.
pub async fn execute(cli: &Cli, globals: &Globals, location: &str, term: &str, filters: &HashMap<String, String>, results_max: usize, details: DetailsArg) -> Result<(), CliError> {
    let result = scrivener_core::query_inventory(globals, location, term, filters, SearchMode::Similar { threshold: 50.0 }, results_max)
        .await
        .map_err(IntoCliError::into_cli_error)?;
    print_result(cli, details, &result);
    Ok(())
}
