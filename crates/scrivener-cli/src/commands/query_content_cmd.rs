//! `query-content LOCATION TERM [--filters k=v...] [--results-max N] [--lines-max N] [--content-id ID]`.

use crate::cli::{Cli, DetailsArg};
use crate::error::{CliError, IntoCliError};
use crate::output::print_result;
use scrivener_core::Globals;
use std::collections::HashMap;

/// Run `query-content`.
///
/// # Errors
///
/// Returns a [`CliError`] (exit code 1) if no inventory/structure processor
/// qualifies, or `--content-id` does not decode or match any object.
#[allow(clippy::too_many_arguments)]
pub async fn execute(
    cli: &Cli,
    globals: &Globals,
    location: &str,
    term: &str,
    filters: &HashMap<String, String>,
    results_max: usize,
    lines_max: usize,
    content_id: Option<&str>,
    details: DetailsArg,
) -> Result<(), CliError> {
    let result = scrivener_core::query_content(globals, location, term, filters, results_max, lines_max, content_id)
        .await
        .map_err(IntoCliError::into_cli_error)?;
    print_result(cli, details, &result);
    Ok(())
}
