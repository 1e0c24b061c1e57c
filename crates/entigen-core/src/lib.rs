//! Core contracts for entigen.
//!
//! This crate defines the normalized schema graph, the naming rules shared by
//! every generated artifact, and the YAML normalizer that infers fields,
//! relations and join tables from the schema shorthand.

pub mod error;
pub mod graph;
pub mod naming;
pub mod normalize;
pub mod schema;
pub mod types;
pub mod validation;

pub use error::{Error, Result};
pub use graph::{RelationGraphReport, RelationGraphSummary, build_relation_graph_report};
pub use normalize::{RawMember, RawSchema, normalize, parse_raw_schema, parse_schema};
pub use schema::{EntityConfig, FieldConfig, ID_FIELD, JoinTableConfig, RelationConfig, Schema};
pub use types::{FieldFormat, FieldKind, PRIMITIVE_TAGS, RelationKind};
pub use validation::validate_schema;
