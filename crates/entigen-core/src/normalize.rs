//! YAML shorthand to schema graph.
//!
//! A schema document maps entity names to members. Each member is one of:
//! - a primitive tag (`title: string`), a plain field;
//! - another entity's name (`author: User`), a belongsTo relation;
//! - a one-element list (`tags: [Tag]`), a manyToMany relation.

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::naming;
use crate::schema::{EntityConfig, FieldConfig, ID_FIELD, RelationConfig, Schema};
use crate::types::{FieldKind, RelationKind};

/// Raw member value as written in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum RawMember {
    Scalar(String),
    List(Vec<Value>),
}

/// Entity name -> member name -> raw value, in document order.
pub type RawSchema = IndexMap<String, IndexMap<String, RawMember>>;

/// Parse and normalize a YAML schema document.
pub fn parse_schema(yaml: &str) -> Result<Schema> {
    let raw = parse_raw_schema(yaml)?;
    normalize(&raw)
}

/// Parse a YAML document into its raw shape without inferring anything.
pub fn parse_raw_schema(yaml: &str) -> Result<RawSchema> {
    let document: Value = serde_yaml::from_str(yaml)?;
    let root = match document {
        Value::Null => return Ok(RawSchema::new()),
        Value::Mapping(root) => root,
        other => {
            return Err(Error::Parse(format!(
                "expected a mapping of entities, found {}",
                describe(&other)
            )));
        }
    };

    let mut raw = RawSchema::new();
    for (key, value) in root {
        let Value::String(entity) = key else {
            return Err(Error::Parse(format!(
                "entity names must be strings, found {}",
                describe(&key)
            )));
        };

        let members = match value {
            Value::Null => IndexMap::new(),
            Value::Mapping(members) => parse_members(&entity, members)?,
            other => {
                return Err(Error::shape(
                    &entity,
                    "*",
                    format!("expected a mapping of members, found {}", describe(&other)),
                ));
            }
        };
        raw.insert(entity, members);
    }

    Ok(raw)
}

fn parse_members(
    entity: &str,
    members: serde_yaml::Mapping,
) -> Result<IndexMap<String, RawMember>> {
    let mut parsed = IndexMap::new();
    for (key, value) in members {
        let Value::String(member) = key else {
            return Err(Error::shape(
                entity,
                format!("{key:?}"),
                "member names must be strings",
            ));
        };

        let raw = match value {
            Value::String(tag) => RawMember::Scalar(tag),
            Value::Sequence(items) => RawMember::List(items),
            other => {
                return Err(Error::shape(
                    entity,
                    &member,
                    format!(
                        "expected a type, an entity name or [Entity], found {}",
                        describe(&other)
                    ),
                ));
            }
        };
        parsed.insert(member, raw);
    }
    Ok(parsed)
}

/// Infer fields, relations and join tables from a raw schema.
pub fn normalize(raw: &RawSchema) -> Result<Schema> {
    let mut schema = Schema::default();

    for (entity_name, members) in raw {
        let mut entity = EntityConfig::new(entity_name.as_str());

        for (member, value) in members {
            if member == ID_FIELD {
                return Err(Error::shape(
                    entity_name,
                    member,
                    "`id` is implicit and cannot be declared",
                ));
            }

            match value {
                RawMember::List(items) => {
                    let target = many_to_many_target(entity_name, member, items)?;
                    require_free_accessor(entity_name, member, RelationKind::ManyToMany)?;
                    require_entity(raw, entity_name, member, target)?;
                    if naming::instance_name(target) == naming::instance_name(entity_name) {
                        return Err(Error::shape(
                            entity_name,
                            member,
                            "self-referential many-to-many relations are not supported",
                        ));
                    }
                    schema.register_join_table(entity_name, target);
                    entity.relations.insert(
                        member.clone(),
                        RelationConfig::many_to_many(entity_name, target),
                    );
                }
                RawMember::Scalar(tag) => match FieldKind::from_tag(tag) {
                    Some((kind, format)) => {
                        insert_field(&mut entity, member, FieldConfig::scalar(kind, format))?;
                    }
                    None => {
                        require_entity(raw, entity_name, member, tag)?;
                        require_free_accessor(entity_name, member, RelationKind::BelongsTo)?;
                        let foreign_key = naming::foreign_key_for(member, tag);
                        insert_field(&mut entity, &foreign_key, FieldConfig::foreign_key())?;
                        entity.relations.insert(
                            member.clone(),
                            RelationConfig::belongs_to(tag.as_str(), foreign_key),
                        );
                    }
                },
            }
        }

        schema.entities.insert(entity_name.clone(), entity);
    }

    Ok(schema)
}

fn many_to_many_target<'a>(entity: &str, member: &str, items: &'a [Value]) -> Result<&'a str> {
    match items {
        [Value::String(target)] => Ok(target.as_str()),
        [other] => Err(Error::shape(
            entity,
            member,
            format!("list element must be an entity name, found {}", describe(other)),
        )),
        _ => Err(Error::shape(
            entity,
            member,
            format!("list shorthand takes exactly one entity, found {}", items.len()),
        )),
    }
}

fn require_entity(raw: &RawSchema, entity: &str, member: &str, target: &str) -> Result<()> {
    if raw.contains_key(target) {
        Ok(())
    } else {
        Err(Error::shape(
            entity,
            member,
            format!("`{target}` is neither a primitive type nor a declared entity"),
        ))
    }
}

fn require_free_accessor(entity: &str, member: &str, kind: RelationKind) -> Result<()> {
    if naming::is_reserved_accessor(member, kind) {
        return Err(Error::shape(
            entity,
            member,
            format!(
                "accessor `{}` clashes with a generated class member",
                naming::relation_accessor(member, kind)
            ),
        ));
    }
    Ok(())
}

fn insert_field(entity: &mut EntityConfig, name: &str, field: FieldConfig) -> Result<()> {
    if entity.fields.contains_key(name) {
        return Err(Error::shape(
            &entity.name,
            name,
            "field is declared more than once",
        ));
    }
    entity.fields.insert(name.to_string(), field);
    Ok(())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
