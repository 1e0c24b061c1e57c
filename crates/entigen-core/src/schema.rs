use indexmap::{IndexMap, IndexSet};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::naming;
use crate::types::{FieldFormat, FieldKind, RelationKind};

/// Name of the implicit identity field every entity owns.
pub const ID_FIELD: &str = "id";

/// Display field candidates, highest priority first.
const DISPLAY_FIELDS: [&str; 2] = ["name", "title"];

/// Fully resolved schema graph produced by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Schema {
    /// Entities in declaration order.
    pub entities: IndexMap<String, EntityConfig>,
    /// Join tables in first-registration order.
    pub join_tables: IndexMap<String, JoinTableConfig>,
}

impl Schema {
    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.get(name)
    }

    /// Entities targeted by at least one manyToMany relation anywhere in the
    /// schema, in first-seen order.
    pub fn many_to_many_targets(&self) -> IndexSet<&str> {
        self.relations()
            .filter(|(_, relation)| relation.kind == RelationKind::ManyToMany)
            .map(|(_, relation)| relation.target.as_str())
            .collect()
    }

    /// Every relation in the schema paired with the entity that declares it.
    pub fn relations(&self) -> impl Iterator<Item = (&EntityConfig, &RelationConfig)> {
        self.entities.values().flat_map(|entity| {
            entity
                .relations
                .values()
                .map(move |relation| (entity, relation))
        })
    }

    /// Register a join table unless one with the same name exists.
    pub fn register_join_table(&mut self, left: &str, right: &str) -> &JoinTableConfig {
        let name = naming::join_table_name(left, right);
        self.join_tables
            .entry(name)
            .or_insert_with(|| JoinTableConfig::new(left, right))
    }
}

/// A schema-declared record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityConfig {
    pub name: String,
    /// Fields in declaration order; `id` is always first.
    pub fields: IndexMap<String, FieldConfig>,
    pub relations: IndexMap<String, RelationConfig>,
}

impl EntityConfig {
    /// Entity seeded with its implicit `id` field.
    pub fn new(name: impl Into<String>) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(ID_FIELD.to_string(), FieldConfig::primary_key());
        Self {
            name: name.into(),
            fields,
            relations: IndexMap::new(),
        }
    }

    pub fn class_name(&self) -> String {
        naming::class_name(&self.name)
    }

    pub fn instance_name(&self) -> String {
        naming::instance_name(&self.name)
    }

    pub fn schema_type_name(&self) -> String {
        naming::schema_type_name(&self.name)
    }

    /// Field used to represent the entity in compact views.
    pub fn display_field(&self) -> &str {
        DISPLAY_FIELDS
            .into_iter()
            .find(|candidate| self.fields.contains_key(*candidate))
            .unwrap_or(ID_FIELD)
    }

    pub fn has_color_field(&self) -> bool {
        self.fields
            .values()
            .any(|field| field.kind == FieldKind::Color)
    }

    /// Fields a user edits, i.e. everything but the identity field.
    pub fn editable_fields(&self) -> impl Iterator<Item = (&String, &FieldConfig)> {
        self.fields.iter().filter(|(name, _)| name.as_str() != ID_FIELD)
    }

    /// Relations that keep a cached list on the entity instance.
    pub fn collection_relations(&self) -> impl Iterator<Item = (&String, &RelationConfig)> {
        self.relations
            .iter()
            .filter(|(_, relation)| relation.kind.is_collection())
    }
}

/// Scalar field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldConfig {
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Source expression for the field's initial value.
    pub default_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub foreign_key: bool,
}

impl FieldConfig {
    /// Plain field for a kind, applying the kind's bounds and default.
    pub fn scalar(kind: FieldKind, format: Option<FieldFormat>) -> Self {
        let (min_length, max_length) = match (kind, format) {
            (FieldKind::String, None) => (Some(1), Some(255)),
            _ => (None, None),
        };
        Self {
            kind,
            format,
            min_length,
            max_length,
            default_value: kind.default_expression().to_string(),
            required: None,
            primary_key: false,
            foreign_key: false,
        }
    }

    /// The implicit `id` field.
    pub fn primary_key() -> Self {
        Self {
            primary_key: true,
            ..Self::scalar(FieldKind::Uuid, None)
        }
    }

    /// UUID column referencing another record; empty until assigned.
    pub fn foreign_key() -> Self {
        Self {
            default_value: "''".to_string(),
            foreign_key: true,
            ..Self::scalar(FieldKind::Uuid, None)
        }
    }
}

/// Relation declared on a source entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationConfig {
    pub kind: RelationKind,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_table: Option<String>,
}

impl RelationConfig {
    pub fn belongs_to(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::BelongsTo,
            target: target.into(),
            foreign_key: Some(foreign_key.into()),
            join_table: None,
        }
    }

    /// One-to-many relation; `foreign_key` lives on the target.
    pub fn has_many(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            kind: RelationKind::HasMany,
            target: target.into(),
            foreign_key: Some(foreign_key.into()),
            join_table: None,
        }
    }

    pub fn many_to_many(source: &str, target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            kind: RelationKind::ManyToMany,
            join_table: Some(naming::join_table_name(source, &target)),
            target,
            foreign_key: None,
        }
    }
}

/// Storage unit recording many-to-many associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JoinTableConfig {
    pub name: String,
    pub left_entity: String,
    pub right_entity: String,
    /// Exactly two UUID foreign keys, `<left>Id` then `<right>Id`.
    pub fields: IndexMap<String, FieldConfig>,
}

impl JoinTableConfig {
    /// Join table for a pair; sides are ordered the same way as the name.
    pub fn new(left: &str, right: &str) -> Self {
        let (left, right) = if naming::instance_name(left) <= naming::instance_name(right) {
            (left, right)
        } else {
            (right, left)
        };
        let mut fields = IndexMap::new();
        for side in [left, right] {
            fields.insert(naming::foreign_key_column(side), FieldConfig::foreign_key());
        }
        Self {
            name: naming::join_table_name(left, right),
            left_entity: left.to_string(),
            right_entity: right.to_string(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_field_priority() {
        let mut entity = EntityConfig::new("post");
        assert_eq!(entity.display_field(), "id");

        entity
            .fields
            .insert("title".to_string(), FieldConfig::scalar(FieldKind::String, None));
        assert_eq!(entity.display_field(), "title");

        entity
            .fields
            .insert("name".to_string(), FieldConfig::scalar(FieldKind::String, None));
        assert_eq!(entity.display_field(), "name");
    }

    #[test]
    fn join_table_orders_sides_like_its_name() {
        let table = JoinTableConfig::new("tag", "post");
        assert_eq!(table.name, "post_tag");
        assert_eq!(table.left_entity, "post");
        assert_eq!(table.right_entity, "tag");
        let keys: Vec<&str> = table.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["postId", "tagId"]);
    }

    #[test]
    fn register_join_table_is_idempotent() {
        let mut schema = Schema::default();
        schema.register_join_table("post", "tag");
        schema.register_join_table("tag", "post");
        assert_eq!(schema.join_tables.len(), 1);
    }
}
