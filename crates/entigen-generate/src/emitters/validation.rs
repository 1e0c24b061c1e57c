use entigen_core::naming;
use entigen_core::{FieldConfig, FieldFormat, FieldKind, Schema};

use crate::model::{ArtifactKind, CodeArtifact, GENERATED_DIR};

/// `schema.ts`: one zod object and inferred type per entity and join table.
pub fn schema_file(schema: &Schema) -> CodeArtifact {
    let entities = schema
        .entities
        .values()
        .map(|entity| zod_object(&entity.name, entity.fields.iter()));
    let join_tables = schema
        .join_tables
        .values()
        .map(|table| zod_object(&table.name, table.fields.iter()));

    let blocks: Vec<String> = entities.chain(join_tables).collect();
    let mut content = "import { z } from 'zod'\n".to_string();
    for block in blocks {
        content.push('\n');
        content.push_str(&block);
        content.push('\n');
    }

    CodeArtifact::new(format!("{GENERATED_DIR}/schema.ts"), ArtifactKind::Schema, content)
        .with_dependencies(vec!["zod".to_string()])
}

fn zod_object<'a>(name: &str, fields: impl Iterator<Item = (&'a String, &'a FieldConfig)>) -> String {
    let lines: Vec<String> = fields
        .map(|(field_name, field)| format!("   {field_name}: {}", zod_type(field)))
        .collect();

    let validator = naming::schema_const_name(name);
    format!(
        "const {validator} = z.object({{\n{}\n}})\n\nexport type {} = z.infer<typeof {validator}>",
        lines.join(",\n"),
        naming::schema_type_name(name)
    )
}

/// Validator expression for a field, bounds and format included.
pub fn zod_type(field: &FieldConfig) -> String {
    let mut expression = match field.kind {
        FieldKind::String | FieldKind::Text | FieldKind::Color | FieldKind::Date => {
            "z.string()".to_string()
        }
        FieldKind::Number => "z.number()".to_string(),
        FieldKind::Boolean => "z.boolean()".to_string(),
        FieldKind::Uuid => "z.uuid()".to_string(),
    };

    if field.format == Some(FieldFormat::Email) {
        expression.push_str(".email()");
    }
    if let Some(min) = field.min_length {
        expression.push_str(&format!(".min({min})"));
    }
    if let Some(max) = field.max_length {
        expression.push_str(&format!(".max({max})"));
    }
    expression
}
