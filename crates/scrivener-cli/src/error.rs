//! CLI error handling with semantic exit codes.
//!
//! Exit codes: `0` success, `1` any engine error, `2` argument errors.

use std::fmt;
use std::process::ExitCode;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Any engine-level failure (exit code 1).
    Engine = 1,
    /// Invalid CLI arguments (exit code 2).
    Usage = 2,
}

impl ErrorCategory {
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn as_exit_code(self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Engine => "engine error",
            Self::Usage => "usage error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self { category, source: source.into() }
    }

    /// Build from an engine error (always category `Engine`).
    pub fn engine(source: scrivener_core::Error) -> Self {
        Self::new(ErrorCategory::Engine, source)
    }

    /// Build a usage error for a bad argument combination.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }

    #[must_use]
    pub fn as_exit_code(&self) -> ExitCode {
        self.category.as_exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Extension trait wrapping an engine error as a `CliError`.
pub trait IntoCliError {
    fn into_cli_error(self) -> CliError;
}

impl IntoCliError for scrivener_core::Error {
    fn into_cli_error(self) -> CliError {
        CliError::engine(self)
    }
}

/// Determine the exit code from an `anyhow::Error`, defaulting to `Engine`
/// (1) for anything not already a [`CliError`].
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<CliError>().map_or(ErrorCategory::Engine.exit_code(), CliError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn exit_codes_match_spec() {
        assert_eq!(ErrorCategory::Engine.exit_code(), 1);
        assert_eq!(ErrorCategory::Usage.exit_code(), 2);
    }

    #[test]
    fn engine_errors_map_to_exit_code_one() {
        let error = scrivener_core::Error::Other("boom".to_string());
        let cli_error = error.into_cli_error();
        assert_eq!(cli_error.exit_code(), 1);
    }

    #[test]
    fn usage_errors_map_to_exit_code_two() {
        let cli_error = CliError::usage(anyhow!("missing --group-by"));
        assert_eq!(cli_error.exit_code(), 2);
    }

    #[test]
    fn unrecognized_anyhow_errors_default_to_engine_exit_code() {
        let err = anyhow!("unexpected failure");
        assert_eq!(exit_code_from_error(&err), 1);
    }

    #[test]
    fn cli_error_downcast_preserves_usage_code() {
        let cli_error = CliError::usage(anyhow!("bad flag"));
        let err: anyhow::Error = cli_error.into();
        assert_eq!(exit_code_from_error(&err), 2);
    }
}
