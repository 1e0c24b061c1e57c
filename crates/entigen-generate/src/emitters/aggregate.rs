use entigen_core::Schema;

use crate::model::{ArtifactKind, CodeArtifact, GENERATED_DIR};

const GENERATED_BANNER: &str = "// GENERATED FILE - DO NOT EDIT";

/// `data.ts`: table name to class constructor map plus schema re-exports.
pub fn data_file(schema: &Schema) -> CodeArtifact {
    let imports: Vec<String> = schema
        .entities
        .values()
        .map(|entity| {
            let class_name = entity.class_name();
            format!("import {{ {class_name} }} from './classes/{class_name}.svelte.js'")
        })
        .collect();
    let constructors: Vec<String> = schema
        .entities
        .values()
        .map(|entity| format!("   {}: {}", entity.instance_name(), entity.class_name()))
        .collect();

    let mut content = format!("{GENERATED_BANNER}\n");
    if !imports.is_empty() {
        content.push_str(&imports.join("\n"));
        content.push('\n');
    }
    content.push_str(&format!(
        "\nexport const constructors = {{\n{}\n}}\n\nexport * from './schema.js'\nexport * from './tables.js'\n",
        constructors.join(",\n")
    ));

    let dependencies = schema
        .entities
        .values()
        .map(|entity| format!("./classes/{}.svelte.js", entity.class_name()))
        .chain(["./schema.js".to_string(), "./tables.js".to_string()])
        .collect();

    CodeArtifact::new(format!("{GENERATED_DIR}/data.ts"), ArtifactKind::Database, content)
        .with_dependencies(dependencies)
}

/// `db.ts`: the storage handle every entity class reaches through `setDB`.
pub fn db_file(db_name: &str) -> CodeArtifact {
    let content = format!(
        "{GENERATED_BANNER}
import {{ DexieAdapter }} from 'sveltekite'
import {{ storesConfig }} from './tables.js'

export const db = new DexieAdapter('{}', storesConfig)
",
        quote_single(db_name)
    );

    CodeArtifact::new(format!("{GENERATED_DIR}/db.ts"), ArtifactKind::Database, content)
        .with_dependencies(vec!["sveltekite".to_string(), "./tables.js".to_string()])
}

fn quote_single(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use entigen_core::parse_schema;

    use super::*;

    #[test]
    fn constructors_map_every_entity() {
        let schema = parse_schema("User:\n  name: string\nPost:\n  author: User\n")
            .expect("parse schema");
        assert_eq!(
            data_file(&schema).content,
            "// GENERATED FILE - DO NOT EDIT
import { User } from './classes/User.svelte.js'
import { Post } from './classes/Post.svelte.js'

export const constructors = {
   user: User,
   post: Post
}

export * from './schema.js'
export * from './tables.js'
"
        );
    }

    #[test]
    fn db_handle_uses_configured_name() {
        let artifact = db_file("blog-db");
        assert_eq!(artifact.target_path, "src/lib/generated/db.ts");
        assert!(
            artifact
                .content
                .contains("export const db = new DexieAdapter('blog-db', storesConfig)")
        );
    }

    #[test]
    fn db_name_is_quoted() {
        assert!(db_file("it's").content.contains("DexieAdapter('it\\'s', storesConfig)"));
    }
}
