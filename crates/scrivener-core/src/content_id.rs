//! Stable, reversible content identifiers for `(location_url, name)` pairs.
//!
//! `content_id` lets a caller round-trip from a [`crate::types::ContentDocument`]
//! back to the exact object it was extracted from without re-running a query,
//! e.g. `query-content --content-id ID`.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const SEPARATOR: char = ':';

/// Encode a `(location_url, name)` pair into a stable content id.
///
/// Uses `base64(len(location_url) + ":" + location_url + name)` rather than
/// a digest so the encoding stays reversible (invariant 3: no digest could
/// decode back to the original pair). The length prefix makes the split
/// position-independent of any `:` inside `location_url` (every URL has one
/// in its scheme) or inside `name`.
#[must_use]
pub fn encode(location_url: &str, name: &str) -> String {
    STANDARD.encode(format!("{}{SEPARATOR}{location_url}{name}", location_url.len()))
}

/// Decode a content id back into its `(location_url, name)` pair.
///
/// # Errors
///
/// Returns [`Error::Other`] if the id is not valid base64, does not contain
/// the length-prefix separator, the prefix is not a valid length, or the
/// decoded body is shorter than the prefixed length.
pub fn decode(content_id: &str) -> Result<(String, String)> {
    let raw = STANDARD
        .decode(content_id)
        .map_err(|e| Error::Other(format!("invalid content_id: {e}")))?;
    let text = String::from_utf8(raw)
        .map_err(|e| Error::Other(format!("invalid content_id encoding: {e}")))?;
    let (len_str, rest) = text
        .split_once(SEPARATOR)
        .ok_or_else(|| Error::Other("content_id missing length prefix".to_string()))?;
    let location_len: usize = len_str
        .parse()
        .map_err(|e| Error::Other(format!("invalid content_id length prefix: {e}")))?;
    if location_len > rest.len() {
        return Err(Error::Other("content_id length prefix exceeds body".to_string()));
    }
    let split_at = rest
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(rest.len()))
        .find(|&i| i == location_len)
        .ok_or_else(|| Error::Other("content_id length prefix splits a character".to_string()))?;
    let (location_url, name) = rest.split_at(split_at);
    Ok((location_url.to_string(), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_trips_basic_pair() {
        let id = encode("https://example.com/en/latest/", "print");
        let (loc, name) = decode(&id).unwrap();
        assert_eq!(loc, "https://example.com/en/latest/");
        assert_eq!(name, "print");
    }

    #[test]
    fn name_containing_colon_round_trips() {
        let id = encode("https://example.com/", "std:print");
        let (loc, name) = decode(&id).unwrap();
        assert_eq!(loc, "https://example.com/");
        assert_eq!(name, "std:print");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(decode("not valid base64!!").is_err());
    }

    proptest! {
        #[test]
        fn round_trip_holds_for_arbitrary_ascii(
            loc in "[a-zA-Z0-9/:._-]{1,40}",
            name in "[a-zA-Z0-9._-]{1,40}",
        ) {
            let id = encode(&loc, &name);
            let (decoded_loc, decoded_name) = decode(&id).unwrap();
            prop_assert_eq!(decoded_loc, loc);
            prop_assert_eq!(decoded_name, name);
        }
    }
}
