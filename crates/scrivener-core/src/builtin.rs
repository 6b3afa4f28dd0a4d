//! Registration wiring for the built-in Sphinx/MkDocs/Pydoctor processors.
//!
//! Registration order is Sphinx, MkDocs, Pydoctor — the same order
//! [`crate::config::DetectionConfig`]'s URL-pattern fallback list and the
//! orchestrator's tie-break rely on when multiple processors qualify with
//! equal confidence.

use crate::processors::mkdocs::{MkdocsInventoryProcessor, MkdocsStructureProcessor};
use crate::processors::pydoctor::{PydoctorInventoryProcessor, PydoctorStructureProcessor};
use crate::processors::sphinx::{SphinxInventoryProcessor, SphinxStructureProcessor};
use crate::registry::ProcessorRegistry;
use std::sync::Arc;

/// Register every built-in inventory and structure processor into `registry`.
pub fn register_all(registry: &mut ProcessorRegistry) {
    registry.register_inventory("sphinx", Arc::new(SphinxInventoryProcessor));
    registry.register_inventory("mkdocs", Arc::new(MkdocsInventoryProcessor));
    registry.register_inventory("pydoctor", Arc::new(PydoctorInventoryProcessor));

    registry.register_structure("sphinx", Arc::new(SphinxStructureProcessor));
    registry.register_structure("mkdocs", Arc::new(MkdocsStructureProcessor));
    registry.register_structure("pydoctor", Arc::new(PydoctorStructureProcessor));
}
