//! Naming rules shared by every artifact.
//!
//! Generated files reference each other by name, so every place that derives
//! a class, directory, key or accessor name must go through these helpers.

use crate::types::RelationKind;

/// Members every generated entity class defines for itself.
pub const RESERVED_MEMBERS: [&str; 8] = [
    "constructor",
    "create",
    "data",
    "db",
    "delete",
    "detail",
    "listItem",
    "snapshot",
];

/// Upper-case the first character (`post` -> `Post`).
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Class/type name of an entity.
pub fn class_name(entity: &str) -> String {
    capitalize(entity)
}

/// Instance, table key and directory name of an entity.
pub fn instance_name(entity: &str) -> String {
    entity.to_lowercase()
}

/// Exported zod type of an entity or join table (`BlogPost` -> `BlogPostSchema`,
/// `post_tag` -> `Post_tagSchema`).
pub fn schema_type_name(name: &str) -> String {
    format!("{}Schema", capitalize(name))
}

/// Module-local zod validator constant (`BlogPost` -> `blogpostSchema`).
pub fn schema_const_name(name: &str) -> String {
    format!("{}Schema", instance_name(name))
}

/// Naive English plural used for collection props (`tag` -> `tags`).
pub fn plural(value: &str) -> String {
    format!("{value}s")
}

/// True when a member name already names a foreign key.
pub fn is_foreign_key_name(member: &str) -> bool {
    member.ends_with("Id") || member.ends_with("_id")
}

/// Foreign key for a belongsTo member: the member itself when it already ends
/// in `Id`/`_id`, otherwise `<target>Id`.
pub fn foreign_key_for(member: &str, target: &str) -> String {
    if is_foreign_key_name(member) {
        member.to_string()
    } else {
        foreign_key_column(target)
    }
}

/// Foreign key column pointing at an entity (`Post` -> `postId`).
pub fn foreign_key_column(entity: &str) -> String {
    format!("{}Id", instance_name(entity))
}

/// Join table for a many-to-many pair; commutative in its arguments.
pub fn join_table_name(left: &str, right: &str) -> String {
    let mut pair = [instance_name(left), instance_name(right)];
    pair.sort();
    format!("{}_{}", pair[0], pair[1])
}

/// Accessor name for a belongsTo relation (`authorId` -> `author`).
pub fn relation_display_name(relation: &str) -> &str {
    let stripped = relation
        .strip_suffix("_id")
        .or_else(|| relation.strip_suffix("Id"))
        .unwrap_or(relation);
    if stripped.is_empty() { relation } else { stripped }
}

/// Getter exposing a relation on the owning class: the display name for
/// belongsTo, the member itself for collections.
pub fn relation_accessor(relation: &str, kind: RelationKind) -> &str {
    match kind {
        RelationKind::BelongsTo => relation_display_name(relation),
        RelationKind::HasMany | RelationKind::ManyToMany => relation,
    }
}

/// True when a relation's getter would shadow a fixed class member.
pub fn is_reserved_accessor(relation: &str, kind: RelationKind) -> bool {
    RESERVED_MEMBERS.contains(&relation_accessor(relation, kind))
}
