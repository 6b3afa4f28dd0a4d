//! Sphinx `objects.inv` parsing and the [`SphinxInventoryProcessor`].
//!
//! Format: a 4-line ASCII header followed by a zlib-compressed body, one
//! object per decompressed line: `name domain:role priority uri dispname`.
//! A trailing `$` in `uri` is a placeholder for `name`, resolved lazily by
//! [`crate::types::InventoryObject::resolved_uri`].

use crate::error::{Error, Result};
use crate::globals::Globals;
use crate::httpcache;
use crate::processors::ensure_trailing_slash;
use crate::registry::InventoryProcessor;
use crate::types::{DetectionInfo, InventoryObject, InventoryProcessorCapabilities, InventoryType, Specifics};
use async_trait::async_trait;
use flate2::read::ZlibDecoder;
use std::collections::HashMap;
use std::io::Read;

/// Sphinx `objects.inv` inventory processor.
pub struct SphinxInventoryProcessor;

#[async_trait]
impl InventoryProcessor for SphinxInventoryProcessor {
    fn name(&self) -> &'static str {
        "sphinx"
    }

    async fn detect(&self, globals: &Globals, location: &str) -> Result<Option<DetectionInfo>> {
        let base = ensure_trailing_slash(location);
        let candidate = format!("{base}objects.inv");
        match httpcache::probe(globals, &candidate).await {
            Ok(true) => Ok(Some(DetectionInfo {
                processor_name: self.name().to_string(),
                confidence: 1.0,
                base_url: base,
                metadata: serde_json::json!({}),
            })),
            _ => Ok(None),
        }
    }

    fn capabilities(&self) -> InventoryProcessorCapabilities {
        InventoryProcessorCapabilities {
            supported_inventory_types: vec![InventoryType::SphinxObjectsInv],
            supported_filters: vec!["domain".to_string(), "role".to_string(), "priority".to_string()],
            recommended_confidence_threshold: 1.0,
        }
    }

    async fn filter_inventory(
        &self,
        globals: &Globals,
        detection: &DetectionInfo,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<InventoryObject>> {
        let url = format!("{}objects.inv", detection.base_url);
        let (bytes, _) = httpcache::retrieve_bytes(globals, &url)
            .await
            .map_err(|e| Error::InventoryInaccessibility { source: url.clone(), cause: e.to_string() })?;
        let objects = parse_objects_inv(&bytes, &detection.base_url, &url)?;
        Ok(apply_filters(objects, filters))
    }
}

/// Parse a raw `objects.inv` byte stream into its inventory objects.
pub(crate) fn parse_objects_inv(bytes: &[u8], base_url: &str, source: &str) -> Result<Vec<InventoryObject>> {
    let invalid = |reason: String| Error::InventoryInvalidity { source: source.to_string(), reason };

    let mut pos = 0usize;
    let mut header_lines = Vec::with_capacity(4);
    while header_lines.len() < 4 {
        let rest = &bytes[pos..];
        let newline = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| invalid("truncated objects.inv header".to_string()))?;
        header_lines.push(String::from_utf8_lossy(&rest[..newline]).into_owned());
        pos += newline + 1;
    }

    if !header_lines[0].starts_with("# Sphinx inventory version") {
        return Err(invalid(format!("unrecognized header line: {:?}", header_lines[0])));
    }
    let project = header_lines[1].strip_prefix("# Project: ").unwrap_or_default().to_string();
    let version = header_lines[2].strip_prefix("# Version: ").unwrap_or_default().to_string();

    let mut decoder = ZlibDecoder::new(&bytes[pos..]);
    let mut decompressed = String::new();
    decoder
        .read_to_string(&mut decompressed)
        .map_err(|e| invalid(format!("zlib decompression failed: {e}")))?;

    let mut objects = Vec::new();
    for line in decompressed.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(object) = parse_object_line(line, base_url, &project, &version) else {
            continue;
        };
        objects.push(object);
    }
    Ok(objects)
}

fn parse_object_line(line: &str, base_url: &str, project: &str, version: &str) -> Option<InventoryObject> {
    let mut parts = line.splitn(5, ' ');
    let name = parts.next()?;
    let domain_role = parts.next()?;
    let priority = parts.next()?;
    let uri = parts.next()?;
    let raw_dispname = parts.next().unwrap_or("-");
    let dispname = if raw_dispname == "-" { name } else { raw_dispname };
    let (domain, role) = domain_role.split_once(':')?;

    Some(InventoryObject {
        name: name.to_string(),
        uri: uri.to_string(),
        inventory_type: InventoryType::SphinxObjectsInv,
        location_url: base_url.to_string(),
        specifics: Specifics::Sphinx {
            domain: domain.to_string(),
            role: role.to_string(),
            priority: priority.parse().unwrap_or(1),
            dispname: dispname.to_string(),
            project: project.to_string(),
            version: version.to_string(),
        },
    })
}

fn apply_filters(objects: Vec<InventoryObject>, filters: &HashMap<String, String>) -> Vec<InventoryObject> {
    if filters.is_empty() {
        return objects;
    }
    objects
        .into_iter()
        .filter(|object| {
            let Specifics::Sphinx { domain, role, priority, .. } = &object.specifics else {
                return true;
            };
            filters.iter().all(|(key, value)| match key.as_str() {
                "domain" => field_matches(domain, value),
                "role" => field_matches(role, value),
                "priority" => priority.to_string() == *value,
                _ => true,
            })
        })
        .collect()
}

fn field_matches(field: &str, value: &str) -> bool {
    field.eq_ignore_ascii_case(value) || field.to_lowercase().contains(&value.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    fn sample_objects_inv() -> Vec<u8> {
        let body = "dulwich.repo.Repo py:class 1 dulwich/repo.html#$ -\n\
                     dulwich.repo.Repo.open py:method 1 dulwich/repo.html#dulwich.repo.Repo.open -\n";
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut out = Vec::new();
        out.extend_from_slice(b"# Sphinx inventory version 2\n");
        out.extend_from_slice(b"# Project: dulwich\n");
        out.extend_from_slice(b"# Version: 1.0\n");
        out.extend_from_slice(b"# The remainder of this file is compressed using zlib.\n");
        out.extend_from_slice(&compressed);
        out
    }

    #[test]
    fn parses_header_and_objects() {
        let bytes = sample_objects_inv();
        let objects = parse_objects_inv(&bytes, "https://example.com/en/latest/", "objects.inv").unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "dulwich.repo.Repo");
        assert_eq!(objects[0].resolved_uri(), "https://example.com/en/latest/dulwich/repo.html#dulwich.repo.Repo");
    }

    #[test]
    fn dispname_of_dash_falls_back_to_name() {
        let bytes = sample_objects_inv();
        let objects = parse_objects_inv(&bytes, "https://example.com/", "objects.inv").unwrap();
        let Specifics::Sphinx { dispname, .. } = &objects[0].specifics else {
            panic!("expected Sphinx specifics");
        };
        assert_eq!(dispname, "dulwich.repo.Repo");
    }

    #[test]
    fn rejects_bad_header() {
        let bytes = b"not an inventory\nline2\nline3\nline4\n".to_vec();
        assert!(parse_objects_inv(&bytes, "https://example.com/", "objects.inv").is_err());
    }

    #[test]
    fn filters_by_domain_and_role() {
        let bytes = sample_objects_inv();
        let objects = parse_objects_inv(&bytes, "https://example.com/", "objects.inv").unwrap();
        let mut filters = HashMap::new();
        filters.insert("role".to_string(), "method".to_string());
        let filtered = apply_filters(objects, &filters);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "dulwich.repo.Repo.open");
    }
}
