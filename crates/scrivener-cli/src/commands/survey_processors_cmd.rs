//! `survey-processors [PROCESSOR_NAME]`.

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::print_result;
use scrivener_core::Globals;

/// Run `survey-processors`.
///
/// # Errors
///
/// Never returns an error: this is a synchronous capability introspection.
pub fn execute(cli: &Cli, globals: &Globals, processor_name: Option<&str>) -> Result<(), CliError> {
    let result = scrivener_core::survey_processors(globals, processor_name);
    print_result(cli, Default::default(), &result);
    Ok(())
}
