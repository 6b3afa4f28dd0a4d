//! Command implementations: one submodule per subcommand.

pub mod detect_cmd;
pub mod query_content_cmd;
pub mod query_inventory_cmd;
pub mod serve_cmd;
pub mod summarize_inventory_cmd;
pub mod survey_processors_cmd;
