//! Per-entity artifact derivation.

mod component;
mod entity_class;

pub use component::ComponentVisitor;
pub use entity_class::EntityClassVisitor;

use entigen_core::{EntityConfig, Schema};

use crate::model::CodeArtifact;

/// Derives artifacts for one entity at a time.
pub trait SchemaVisitor {
    fn visit_entity(&self, entity: &EntityConfig) -> Vec<CodeArtifact>;

    /// Visit every entity in declaration order.
    fn visit_schema(&self, schema: &Schema) -> Vec<CodeArtifact> {
        schema
            .entities
            .values()
            .flat_map(|entity| self.visit_entity(entity))
            .collect()
    }
}
