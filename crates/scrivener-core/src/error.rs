//! Error types for the documentation intelligence engine.
//!
//! This module defines the single rooted error hierarchy the rest of the
//! engine returns: every public operation resolves to `Result<T, Error>`, and
//! every variant knows how to render itself as JSON or Markdown for the CLI
//! and RPC front ends (see [`crate::result::Renderable`]).
//!
//! ## Error Categories
//!
//! - **Unavailability**: no processor qualified for a location (`ProcessorInavailability`)
//! - **Inaccessibility**: network/HTTP failure fetching an inventory or page
//! - **Invalidity**: malformed inventory content
//! - **Parse failure**: HTML structure not recognized by a structure processor
//! - **Policy**: blocked by robots.txt
//! - **I/O and network**: ambient failures every engine carries regardless of domain

use crate::result::Renderable;
use serde_json::{Value, json};
use thiserror::Error;

/// The root error type for scrivener-core operations.
///
/// All public functions return `Result<T, Error>`. Every variant is
/// immutable context plus a renderer; nothing here panics or unwraps.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed (local file access for `file://` locations, config files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed (HTTP probe/retrieve, robots fetch).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No processor of the required genus reached the selection threshold for a
    /// location, even after URL-pattern fallback.
    #[error(
        "No processor qualified for '{source}' ({genus}); tried patterns: {url_patterns_attempted:?}"
    )]
    ProcessorInavailability {
        /// The location that was probed.
        source: String,
        /// Processor genus: "inventory" or "structure".
        genus: String,
        /// URL-pattern variants attempted beyond the bare location.
        url_patterns_attempted: Vec<String>,
    },

    /// An inventory could not be fetched.
    #[error("Inventory inaccessible at '{source}': {cause}")]
    InventoryInaccessibility {
        /// The inventory URL that could not be reached.
        source: String,
        /// Human-readable cause.
        cause: String,
    },

    /// An inventory was fetched but could not be parsed.
    #[error("Inventory at '{source}' is invalid: {reason}")]
    InventoryInvalidity {
        /// The inventory URL.
        source: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A documentation page could not be fetched during content extraction.
    #[error("Documentation page inaccessible at '{url}': {cause}")]
    DocumentationInaccessibility {
        /// The page URL.
        url: String,
        /// Human-readable cause.
        cause: String,
    },

    /// A documentation page was fetched but its structure could not be parsed.
    #[error("Failed to parse documentation structure at '{url}': {reason}")]
    DocumentationParseFailure {
        /// The page URL.
        url: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A request was blocked by the target host's robots.txt policy.
    #[error("Blocked by robots.txt: '{url}' disallows user-agent '{user_agent}'")]
    RobotsTxtBlockedUrl {
        /// The URL that was disallowed.
        url: String,
        /// The user agent that was denied.
        user_agent: String,
    },

    /// Generic error for uncategorized failures, or wrapped third-party errors.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InventoryInvalidity {
            source: String::new(),
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            Self::InventoryInaccessibility { .. } | Self::DocumentationInaccessibility { .. } => {
                true
            },
            _ => false,
        }
    }

    /// Get the error category as a string identifier, used for logging and metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Config(_) => "config",
            Self::ProcessorInavailability { .. } => "unavailability",
            Self::InventoryInaccessibility { .. } | Self::DocumentationInaccessibility { .. } => {
                "inaccessibility"
            },
            Self::InventoryInvalidity { .. } => "invalidity",
            Self::DocumentationParseFailure { .. } => "parse",
            Self::RobotsTxtBlockedUrl { .. } => "policy",
            Self::Other(_) => "other",
        }
    }

    /// A short, user-facing title for this error, independent of the full message.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Io(_) => "I/O error",
            Self::Network(_) => "Network error",
            Self::Config(_) => "Configuration error",
            Self::ProcessorInavailability { .. } => "No matching processor",
            Self::InventoryInaccessibility { .. } => "Inventory unreachable",
            Self::InventoryInvalidity { .. } => "Inventory malformed",
            Self::DocumentationInaccessibility { .. } => "Documentation page unreachable",
            Self::DocumentationParseFailure { .. } => "Documentation structure unrecognized",
            Self::RobotsTxtBlockedUrl { .. } => "Blocked by robots.txt",
            Self::Other(_) => "Internal error",
        }
    }

    /// A suggestion to surface alongside the error message, if one applies.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ProcessorInavailability { .. } => Some(
                "Verify the URL points to a supported documentation format (Sphinx, MkDocs, or Pydoctor).",
            ),
            Self::DocumentationParseFailure { .. } => Some(
                "The page theme may not be recognized; check for a custom Sphinx/MkDocs theme.",
            ),
            Self::RobotsTxtBlockedUrl { .. } => Some(
                "The site's robots.txt disallows this path; respect the policy or contact the site owner.",
            ),
            _ => None,
        }
    }
}

impl Renderable for Error {
    fn render_as_json(&self) -> Value {
        json!({
            "error": {
                "type": self.category(),
                "title": self.title(),
                "message": self.to_string(),
                "suggestion": self.suggestion(),
            }
        })
    }

    fn render_as_markdown(&self, reveal_internals: bool) -> String {
        let mut out = format!("**{}**: {}\n", self.title(), self);
        if let Some(suggestion) = self.suggestion() {
            out.push_str(&format!("\n_Suggestion_: {suggestion}\n"));
        }
        if reveal_internals {
            out.push_str(&format!("\n```\ncategory: {}\n```\n", self.category()));
        }
        out
    }
}

/// Convenience alias for `std::result::Result<T, Error>`, used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_matches_variant() {
        let e = Error::RobotsTxtBlockedUrl {
            url: "https://example.com/x".into(),
            user_agent: "scrivener".into(),
        };
        assert_eq!(e.category(), "policy");
        assert!(!e.is_recoverable());
    }

    #[test]
    fn inaccessibility_is_recoverable() {
        let e = Error::InventoryInaccessibility {
            source: "https://example.com/objects.inv".into(),
            cause: "timeout".into(),
        };
        assert!(e.is_recoverable());
    }

    #[test]
    fn render_as_json_has_error_envelope() {
        let e = Error::ProcessorInavailability {
            source: "https://example.com".into(),
            genus: "inventory".into(),
            url_patterns_attempted: vec!["/en/latest/".into()],
        };
        let v = e.render_as_json();
        assert_eq!(v["error"]["type"], "unavailability");
        assert!(v["error"]["suggestion"].is_string());
    }
}
