//! Built-in inventory/structure processors, one submodule per documentation
//! generator: [`sphinx`], [`mkdocs`], [`pydoctor`].

pub mod mkdocs;
pub mod pydoctor;
pub mod sphinx;

/// Ensure `location` ends with `/`, so path-joining via `format!` never
/// collides the last path segment with the appended filename.
pub(crate) fn ensure_trailing_slash(location: &str) -> String {
    if location.ends_with('/') {
        location.to_string()
    } else {
        format!("{location}/")
    }
}

/// Split `url#anchor` into `(url, Some(anchor))`, or `(url, None)` if there
/// is no fragment.
pub(crate) fn split_anchor(url: &str) -> (String, Option<String>) {
    match url.split_once('#') {
        Some((base, anchor)) if !anchor.is_empty() => (base.to_string(), Some(anchor.to_string())),
        _ => (url.to_string(), None),
    }
}
