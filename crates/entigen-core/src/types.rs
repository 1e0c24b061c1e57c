use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Primitive tags accepted in the schema shorthand, in declaration order.
pub const PRIMITIVE_TAGS: [&str; 8] = [
    "string", "text", "number", "boolean", "date", "uuid", "email", "color",
];

/// Storage kind of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Text,
    Number,
    Boolean,
    Date,
    Uuid,
    Color,
}

/// Validation format layered on top of a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    Email,
}

impl FieldKind {
    /// Resolve a shorthand tag into a kind and optional format.
    ///
    /// `email` is not a kind of its own: it is a string with an email format.
    pub fn from_tag(tag: &str) -> Option<(FieldKind, Option<FieldFormat>)> {
        let resolved = match tag {
            "string" => (FieldKind::String, None),
            "text" => (FieldKind::Text, None),
            "number" => (FieldKind::Number, None),
            "boolean" => (FieldKind::Boolean, None),
            "date" => (FieldKind::Date, None),
            "uuid" => (FieldKind::Uuid, None),
            "email" => (FieldKind::String, Some(FieldFormat::Email)),
            "color" => (FieldKind::Color, None),
            _ => return None,
        };
        Some(resolved)
    }

    /// Default value expression emitted into generated code for this kind.
    pub fn default_expression(self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Text | FieldKind::Color => "''",
            FieldKind::Number => "0",
            FieldKind::Boolean => "false",
            FieldKind::Date => "new Date().toISOString()",
            FieldKind::Uuid => "crypto.randomUUID()",
        }
    }

    /// True for kinds edited as free-form text.
    pub fn is_textual(self) -> bool {
        matches!(self, FieldKind::String | FieldKind::Text)
    }
}

/// Cardinality of a relation between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    BelongsTo,
    HasMany,
    ManyToMany,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongsTo",
            RelationKind::HasMany => "hasMany",
            RelationKind::ManyToMany => "manyToMany",
        }
    }

    /// Relations that keep a cached list of related records on the source.
    pub fn is_collection(self) -> bool {
        matches!(self, RelationKind::HasMany | RelationKind::ManyToMany)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
