//! `detect LOCATION [--genus inventory|structure]`.

use crate::cli::{Cli, GenusArg};
use crate::error::CliError;
use crate::output::print_result;
use scrivener_core::Globals;

/// Run `detect`, printing whichever genera were requested.
///
/// # Errors
///
/// Never returns an error: non-qualification is reported as `null`, not a failure.
pub async fn execute(cli: &Cli, globals: &Globals, location: &str, genus: GenusArg) -> Result<(), CliError> {
    let mut result = scrivener_core::detect(globals, location).await;
    match genus {
        GenusArg::Both => {},
        GenusArg::Inventory => result.structure = None,
        GenusArg::Structure => result.inventory = None,
    }
    print_result(cli, Default::default(), &result);
    Ok(())
}
