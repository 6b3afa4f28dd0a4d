//! Rendering a query result or error in the requested [`DisplayFormat`].

use crate::cli::{Cli, DetailsArg, DisplayFormat};
use scrivener_core::result::Renderable;

/// Print a successful result in the format the user asked for.
pub fn print_result<R: Renderable>(cli: &Cli, details: DetailsArg, result: &R) {
    match cli.display_format {
        DisplayFormat::Json => println!("{}", result.render_as_json()),
        DisplayFormat::Markdown => {
            let level: scrivener_core::DetailLevel = details.into();
            print!("{}", result.render_as_markdown(level.reveal_internals()));
        },
    }
}

/// Print an engine error in the format the user asked for.
pub fn print_error(cli: &Cli, error: &scrivener_core::Error) {
    match cli.display_format {
        DisplayFormat::Json => eprintln!("{}", error.render_as_json()),
        DisplayFormat::Markdown => eprint!("{}", error.render_as_markdown(false)),
    }
}
