use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::naming;
use crate::schema::{ID_FIELD, Schema};
use crate::types::{FieldKind, RelationKind};

/// Validate internal consistency of a schema graph.
///
/// This checks:
/// - every entity has exactly one `id` field and it comes first
/// - relation targets exist
/// - belongsTo foreign keys exist as UUID fields on the owning entity
/// - manyToMany join tables exist and reference both sides
/// - join tables hold exactly two UUID keys
/// - relation getters do not shadow fixed class members
pub fn validate_schema(schema: &Schema) -> Result<()> {
    let mut instance_names = BTreeSet::new();

    for (name, entity) in &schema.entities {
        if name != &entity.name {
            return Err(Error::InvalidSchema(format!(
                "entity registered as {name} is named {}",
                entity.name
            )));
        }

        if !instance_names.insert(naming::instance_name(name)) {
            return Err(Error::InvalidSchema(format!(
                "entity names collide when lower-cased: {name}"
            )));
        }

        match entity.fields.first() {
            Some((first, field)) if first == ID_FIELD && field.kind == FieldKind::Uuid => {}
            _ => {
                return Err(Error::InvalidSchema(format!(
                    "entity {name} must start with a uuid `id` field"
                )));
            }
        }

        for (relation_name, relation) in &entity.relations {
            if !schema.entities.contains_key(&relation.target) {
                return Err(Error::InvalidSchema(format!(
                    "relation target not found: {name}.{relation_name} -> {}",
                    relation.target
                )));
            }

            if naming::is_reserved_accessor(relation_name, relation.kind) {
                return Err(Error::InvalidSchema(format!(
                    "relation {name}.{relation_name} shadows a generated class member"
                )));
            }

            match relation.kind {
                RelationKind::BelongsTo => {
                    let foreign_key = relation.foreign_key.as_deref().ok_or_else(|| {
                        Error::InvalidSchema(format!(
                            "belongsTo relation without foreign key: {name}.{relation_name}"
                        ))
                    })?;
                    let field = entity.fields.get(foreign_key).ok_or_else(|| {
                        Error::InvalidSchema(format!(
                            "foreign key field not found: {name}.{foreign_key}"
                        ))
                    })?;
                    if field.kind != FieldKind::Uuid {
                        return Err(Error::InvalidSchema(format!(
                            "foreign key field is not a uuid: {name}.{foreign_key}"
                        )));
                    }
                }
                RelationKind::HasMany => {
                    if relation.foreign_key.is_none() {
                        return Err(Error::InvalidSchema(format!(
                            "hasMany relation without foreign key: {name}.{relation_name}"
                        )));
                    }
                }
                RelationKind::ManyToMany => {
                    let join_table = relation.join_table.as_deref().ok_or_else(|| {
                        Error::InvalidSchema(format!(
                            "manyToMany relation without join table: {name}.{relation_name}"
                        ))
                    })?;
                    let expected = naming::join_table_name(name, &relation.target);
                    if join_table != expected {
                        return Err(Error::InvalidSchema(format!(
                            "join table for {name}.{relation_name} should be {expected}, found {join_table}"
                        )));
                    }
                    if !schema.join_tables.contains_key(join_table) {
                        return Err(Error::InvalidSchema(format!(
                            "join table not registered: {join_table}"
                        )));
                    }
                }
            }
        }
    }

    for (name, table) in &schema.join_tables {
        for side in [&table.left_entity, &table.right_entity] {
            if !schema.entities.contains_key(side) {
                return Err(Error::InvalidSchema(format!(
                    "join table {name} references unknown entity {side}"
                )));
            }
        }

        if table.fields.len() != 2 || table.fields.values().any(|f| f.kind != FieldKind::Uuid) {
            return Err(Error::InvalidSchema(format!(
                "join table {name} must hold exactly two uuid keys"
            )));
        }
    }

    Ok(())
}
