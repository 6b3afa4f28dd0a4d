//! Primary entrypoint for the `scrivener` CLI binary.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    scrivener_cli::run().await
}
