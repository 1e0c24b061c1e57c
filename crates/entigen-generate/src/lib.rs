//! Artifact generation for entigen.
//!
//! This crate turns a normalized schema graph into project files: zod
//! validation schemas, Dexie table configuration, one reactive class per
//! entity, its Svelte components and the generic CRUD routes.

pub mod catalog;
pub mod emitters;
pub mod engine;
pub mod errors;
pub mod model;
pub mod output;
pub mod template;
pub mod visitors;

pub use catalog::{RelationContext, RelationRequirements, process_template, requirements};
pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use model::{
    ArtifactKind, CodeArtifact, ComponentKind, GenerateOptions, GenerationReport, WriteFailure,
};
pub use template::TemplateEngine;
pub use visitors::{ComponentVisitor, EntityClassVisitor, SchemaVisitor};
