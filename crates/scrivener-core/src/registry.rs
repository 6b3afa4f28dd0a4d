//! Processor registry: two ordered maps, `name -> processor`, one per
//! genus. Registration order is the tie-break applied by the orchestrator
//! when multiple processors report equal confidence.

use crate::error::Result;
use crate::globals::Globals;
use crate::types::{
    ContentDocument, DetectionInfo, InventoryObject, InventoryProcessorCapabilities,
    StructureProcessorCapabilities,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// A processor that turns a location into an `InventoryObject` list.
#[async_trait]
pub trait InventoryProcessor: Send + Sync {
    /// Stable registry name, e.g. `"sphinx"`.
    fn name(&self) -> &'static str;

    /// Probe `location`, returning `None` if this processor found nothing.
    async fn detect(&self, globals: &Globals, location: &str) -> Result<Option<DetectionInfo>>;

    /// What this processor can parse and filter.
    fn capabilities(&self) -> InventoryProcessorCapabilities;

    /// Fetch and parse the inventory at `detection.base_url`, applying
    /// `filters` (keys defined by `capabilities().supported_filters`).
    async fn filter_inventory(
        &self,
        globals: &Globals,
        detection: &DetectionInfo,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<InventoryObject>>;
}

/// A processor that turns inventory objects into extracted documentation.
#[async_trait]
pub trait StructureProcessor: Send + Sync {
    /// Stable registry name, e.g. `"sphinx"`.
    fn name(&self) -> &'static str;

    /// Probe `location`'s HTML structure, returning `None` if unrecognized.
    async fn detect(&self, globals: &Globals, location: &str) -> Result<Option<DetectionInfo>>;

    /// What this processor can extract and with what confidence per inventory type.
    fn capabilities(&self) -> StructureProcessorCapabilities;

    /// Extract one `ContentDocument` per object, bounded to `concurrency`
    /// in-flight fetches. Failures become `None` at that position
    /// (partial-success semantics); input order is preserved.
    async fn extract_contents(
        &self,
        globals: &Globals,
        detection: &DetectionInfo,
        objects: &[InventoryObject],
        concurrency: usize,
    ) -> Vec<Option<ContentDocument>>;
}

/// Ordered `name -> processor` maps for both genera.
#[derive(Default)]
pub struct ProcessorRegistry {
    inventory: Vec<(String, Arc<dyn InventoryProcessor>)>,
    structure: Vec<(String, Arc<dyn StructureProcessor>)>,
}

impl ProcessorRegistry {
    /// An empty registry; built-ins are added separately (see
    /// [`crate::builtin::register_all`]) so a caller can build a registry
    /// with only the processors it wants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an inventory processor under `name`. Later registrations
    /// with the same name replace the earlier one but keep its position.
    pub fn register_inventory(&mut self, name: impl Into<String>, processor: Arc<dyn InventoryProcessor>) {
        let name = name.into();
        if let Some(slot) = self.inventory.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = processor;
        } else {
            self.inventory.push((name, processor));
        }
    }

    /// Register a structure processor under `name`.
    pub fn register_structure(&mut self, name: impl Into<String>, processor: Arc<dyn StructureProcessor>) {
        let name = name.into();
        if let Some(slot) = self.structure.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = processor;
        } else {
            self.structure.push((name, processor));
        }
    }

    /// Iterate inventory processors in registration order.
    pub fn inventory_iter(&self) -> impl Iterator<Item = &Arc<dyn InventoryProcessor>> {
        self.inventory.iter().map(|(_, p)| p)
    }

    /// Iterate structure processors in registration order.
    pub fn structure_iter(&self) -> impl Iterator<Item = &Arc<dyn StructureProcessor>> {
        self.structure.iter().map(|(_, p)| p)
    }

    /// Look up an inventory processor by name.
    #[must_use]
    pub fn inventory_get(&self, name: &str) -> Option<&Arc<dyn InventoryProcessor>> {
        self.inventory.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    /// Look up a structure processor by name.
    #[must_use]
    pub fn structure_get(&self, name: &str) -> Option<&Arc<dyn StructureProcessor>> {
        self.structure.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    /// Names of all registered inventory processors, in registration order.
    #[must_use]
    pub fn inventory_processor_names(&self) -> Vec<&str> {
        self.inventory.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Names of all registered structure processors, in registration order.
    #[must_use]
    pub fn structure_processor_names(&self) -> Vec<&str> {
        self.structure.iter().map(|(n, _)| n.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InventoryType;

    struct Noop;

    #[async_trait]
    impl InventoryProcessor for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }
        async fn detect(&self, _: &Globals, _: &str) -> Result<Option<DetectionInfo>> {
            Ok(None)
        }
        fn capabilities(&self) -> InventoryProcessorCapabilities {
            InventoryProcessorCapabilities {
                supported_inventory_types: vec![InventoryType::SphinxObjectsInv],
                supported_filters: vec![],
                recommended_confidence_threshold: 0.5,
            }
        }
        async fn filter_inventory(
            &self,
            _: &Globals,
            _: &DetectionInfo,
            _: &HashMap<String, String>,
        ) -> Result<Vec<InventoryObject>> {
            Ok(vec![])
        }
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = ProcessorRegistry::new();
        registry.register_inventory("a", Arc::new(Noop));
        registry.register_inventory("b", Arc::new(Noop));
        assert_eq!(registry.inventory_processor_names(), vec!["a", "b"]);
    }

    #[test]
    fn reregistering_same_name_keeps_position() {
        let mut registry = ProcessorRegistry::new();
        registry.register_inventory("a", Arc::new(Noop));
        registry.register_inventory("b", Arc::new(Noop));
        registry.register_inventory("a", Arc::new(Noop));
        assert_eq!(registry.inventory_processor_names(), vec!["a", "b"]);
    }

    #[test]
    fn get_finds_registered_processor() {
        let mut registry = ProcessorRegistry::new();
        registry.register_inventory("sphinx", Arc::new(Noop));
        assert!(registry.inventory_get("sphinx").is_some());
        assert!(registry.inventory_get("missing").is_none());
    }
}
