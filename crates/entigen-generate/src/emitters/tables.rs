use entigen_core::naming;
use entigen_core::{ID_FIELD, Schema};

use crate::model::{ArtifactKind, CodeArtifact, GENERATED_DIR};

/// `tables.ts`: the typed table map and the Dexie store definitions.
pub fn tables_file(schema: &Schema) -> CodeArtifact {
    let schema_types: Vec<String> = schema
        .entities
        .values()
        .map(|entity| entity.schema_type_name())
        .chain(schema.join_tables.keys().map(|name| naming::schema_type_name(name)))
        .collect();

    let mut content = "import type { EntityTable } from 'dexie'\n".to_string();
    if !schema_types.is_empty() {
        content.push_str(&format!(
            "import type {{ {} }} from './schema.js'\n",
            schema_types.join(", ")
        ));
    }

    let table_lines: Vec<String> = schema
        .entities
        .values()
        .map(|entity| {
            format!(
                "   {}: EntityTable<{}, 'id'>",
                entity.instance_name(),
                entity.schema_type_name()
            )
        })
        .chain(schema.join_tables.keys().map(|name| {
            format!("   {name}: EntityTable<{}>", naming::schema_type_name(name))
        }))
        .collect();

    content.push_str(&format!(
        "\nexport interface TableNames {{\n{}\n}}\n",
        table_lines.join("\n")
    ));
    content.push_str(&format!("\nexport const storesConfig = {}\n", stores_config(schema)));

    CodeArtifact::new(format!("{GENERATED_DIR}/tables.ts"), ArtifactKind::Schema, content)
        .with_dependencies(vec!["dexie".to_string(), "./schema.js".to_string()])
}

/// Store definitions: `&id` plus every other field indexed; join tables are
/// keyed by the compound of their two foreign keys.
pub fn stores_config(schema: &Schema) -> String {
    let entity_stores = schema.entities.values().map(|entity| {
        let definition = std::iter::once(format!("&{ID_FIELD}"))
            .chain(
                entity
                    .fields
                    .keys()
                    .filter(|name| name.as_str() != ID_FIELD)
                    .cloned(),
            )
            .collect::<Vec<_>>()
            .join(", ");
        format!("   {}: \"{definition}\"", entity.instance_name())
    });

    let join_stores = schema.join_tables.values().map(|table| {
        let keys: Vec<&str> = table.fields.keys().map(String::as_str).collect();
        format!(
            "   {}: \"&[{}], {}\"",
            table.name,
            keys.join("+"),
            keys.join(", ")
        )
    });

    let stores: Vec<String> = entity_stores.chain(join_stores).collect();
    format!("{{\n{}\n}}", stores.join(",\n"))
}
