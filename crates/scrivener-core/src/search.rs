//! Fuzzy search / match engine.
//!
//! Built on `strsim` for edit-distance-based `ratio`/`partial_ratio`
//! similarity: `ratio` is `strsim::normalized_levenshtein * 100`;
//! `partial_ratio` slides the shorter string across the longer one and
//! takes the best windowed `normalized_levenshtein`.

use crate::types::{InventoryObject, MatchReason, SearchResult};
use regex::Regex;

/// Which matching mode to apply.
#[derive(Debug, Clone)]
pub enum SearchMode {
    /// Case-insensitive (by default) equality on `name`.
    Exact,
    /// Regular-expression match on `name`.
    Pattern(Regex),
    /// Fuzzy ranking via `max(partial_ratio, ratio)`.
    Similar {
        /// Minimum score (0-100 scale) for a fuzzy match to be retained.
        threshold: f64,
    },
}

/// Search options independent of the mode.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Selected mode.
    pub mode: SearchMode,
    /// Case-sensitivity flag; default false (term and name lower-cased).
    pub case_sensitive: bool,
    /// Always include substring matches at score 0.8, even under Exact/Similar.
    pub contains_term: bool,
    /// Cap on the number of results returned.
    pub results_max: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Similar { threshold: 50.0 },
            case_sensitive: false,
            contains_term: false,
            results_max: 50,
        }
    }
}

/// Full-string edit similarity in `[0, 100]`.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best substring-alignment similarity in `[0, 100]`: slide the shorter
/// string across the longer one and take the best windowed `ratio`.
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    if shorter.is_empty() {
        return if longer.is_empty() { 100.0 } else { 0.0 };
    }
    let shorter_len = shorter.chars().count();
    let longer_chars: Vec<char> = longer.chars().collect();
    if longer_chars.len() <= shorter_len {
        return ratio(shorter, longer);
    }

    let mut best = 0.0f64;
    for start in 0..=(longer_chars.len() - shorter_len) {
        let window: String = longer_chars[start..start + shorter_len].iter().collect();
        let score = ratio(shorter, &window);
        if score > best {
            best = score;
        }
    }
    best
}

/// Rank `objects` against `term` according to `options`, returning results
/// sorted descending by score, ties broken by insertion order (stable sort),
/// capped by `options.results_max`.
#[must_use]
pub fn search(objects: &[InventoryObject], term: &str, options: &SearchOptions) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = Vec::new();

    for object in objects {
        let (name, needle) = if options.case_sensitive {
            (object.name.clone(), term.to_string())
        } else {
            (object.name.to_lowercase(), term.to_lowercase())
        };

        let matched = match &options.mode {
            SearchMode::Exact => exact_match(&name, &needle, options.contains_term),
            SearchMode::Pattern(re) => pattern_match(re, &name),
            SearchMode::Similar { threshold } => {
                similar_match(&name, &needle, *threshold, options.contains_term)
            },
        };

        if let Some((score, reason)) = matched {
            results.push(SearchResult {
                object: object.clone(),
                score,
                match_reason: reason,
            });
        }
    }

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(options.results_max);
    results
}

fn exact_match(name: &str, needle: &str, contains_term: bool) -> Option<(f64, MatchReason)> {
    if name == needle {
        return Some((1.0, MatchReason::Exact));
    }
    if contains_term && name.contains(needle) {
        return Some((0.8, MatchReason::Contains));
    }
    None
}

fn pattern_match(re: &Regex, name: &str) -> Option<(f64, MatchReason)> {
    re.is_match(name).then_some((1.0, MatchReason::Pattern))
}

fn similar_match(
    name: &str,
    needle: &str,
    threshold: f64,
    contains_term: bool,
) -> Option<(f64, MatchReason)> {
    if name == needle {
        return Some((1.0, MatchReason::Exact));
    }
    if name.starts_with(needle) {
        return Some((0.9, MatchReason::StartsWith));
    }
    if name.contains(needle) {
        return Some((0.8, MatchReason::Contains));
    }
    let max_score = partial_ratio(needle, name).max(ratio(needle, name));
    if max_score >= threshold {
        return Some((max_score / 100.0, MatchReason::Partial));
    }
    if contains_term && name.contains(needle) {
        return Some((0.8, MatchReason::Contains));
    }
    None
}
