//! `summarize-inventory LOCATION [TERM] [--group-by FIELD]`.

use crate::cli::Cli;
use crate::error::{CliError, IntoCliError};
use crate::output::print_result;
use scrivener_core::Globals;
use std::collections::HashMap;

/// Run `summarize-inventory`.
///
/// # Errors
///
/// Returns a [`CliError`] (exit code 1) if no inventory processor qualifies.
pub async fn execute(cli: &Cli, globals: &Globals, location: &str, term: Option<&str>, group_by: Option<&str>) -> Result<(), CliError> {
    let result = scrivener_core::summarize_inventory(globals, location, term, &HashMap::new(), group_by).await.map_err(IntoCliError::into_cli_error)?;
    print_result(cli, Default::default(), &result);
    Ok(())
}
