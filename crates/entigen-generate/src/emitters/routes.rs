use crate::model::{ArtifactKind, CodeArtifact, ROUTES_DIR};

const TABLE_LOAD: &str = r#"import type { PageLoad } from "./$types.js";
import { db } from '$lib/generated/db.js'
import { constructors } from "$lib/generated/data.js";
import type { TableNames } from "$lib/generated/tables.js";

type ValidTableName = keyof typeof constructors;

function isValidTableName(tableName: string): tableName is ValidTableName {
   return tableName in constructors;
}

function tableExistsInDb(tableName: string): tableName is keyof TableNames {
   return db.tables.some(table => table.name === tableName);
}

export const load: PageLoad = async ({ params }) => {
   const tableName = params.table;

   if (tableExistsInDb(tableName) && isValidTableName(tableName)) {
      const result = await db.all(tableName) as any[];
      const Constructor = constructors[tableName];

      return {
         entries: result.map(data => new Constructor(data)),
         constructor: Constructor,
         table: params.table
      };
   } else {
      return {};
   }
}
"#;

const TABLE_PAGE: &str = r#"<script lang="ts">
   import { invalidateAll } from "$app/navigation";

   type ValidClass = {
      create: Function
   }

   type Data = {
      entries: any[];
      constructor: ValidClass;
      table: string;
   };

   let { data }: { data: Data } = $props();

   function add() {
      data.constructor.create();
      invalidateAll();
   }
</script>

<h2>{data.table}s</h2>
<button onclick={add}>add</button>
<ul>
   {#each data.entries as el}
      <li><a href={`/${data.table}/${el.data.id}`}><el.listItem /></a></li>
   {/each}
</ul>
"#;

const DETAIL_LOAD: &str = r#"import type { PageLoad } from "./$types.js";
import { db } from '$lib/generated/db.js'
import { constructors } from "$lib/generated/data.js";
import type { TableNames } from "$lib/generated/tables.js";

type ValidTableName = keyof typeof constructors;

function isValidTableName(tableName: string): tableName is ValidTableName {
   return tableName in constructors;
}

function tableExistsInDb(tableName: string): tableName is keyof TableNames {
   return db.tables.some(table => table.name === tableName);
}

export const load: PageLoad = async ({ params }) => {
   const tableName = params.table;

   if (tableExistsInDb(tableName) && isValidTableName(tableName)) {
      const data = await db.get(params.table as keyof TableNames)(params.id)
      const Constructor = constructors[tableName];

      return {
         // @ts-ignore
         [tableName]: new Constructor(data)
      };
   } else {
      return {};
   }
}
"#;

const DETAIL_PAGE: &str = r#"<script lang="ts">
   let { data }: { data: Record<string, Record<string, any>>} = $props()
</script>

{#each Object.values(data) as obj}
   <obj.detail />
{/each}
"#;

const LAYOUT_LOAD: &str = r#"import { setDB } from 'sveltekite'
import { db } from '$lib/generated/db.js'

setDB(db)

export const ssr = false
"#;

const LAYOUT_PAGE: &str = r#"<script lang="ts">
   import { db } from '$lib/generated/db.js'
   import { constructors } from '$lib/generated/data.js'

   const entityTables = Object.keys(constructors)
</script>

{#if db}
<nav>
   <ul>
      <li><a href="/">Home</a></li>
      {#each entityTables as name}
         <li><a href={`/${name}`}>{name}</a></li>
      {/each}
   </ul>
</nav>
<slot />
{:else}
   No Database Configured
{/if}
"#;

/// Generic CRUD pages for any table plus the layout that installs the
/// storage handle.
pub fn route_files() -> Vec<CodeArtifact> {
    const LOADER_DEPS: &[&str] = &[
        "$lib/generated/db.js",
        "$lib/generated/data.js",
        "$lib/generated/tables.js",
    ];

    [
        ("[table]/+page.ts", TABLE_LOAD, LOADER_DEPS),
        ("[table]/+page.svelte", TABLE_PAGE, &["$app/navigation"][..]),
        ("[table]/[id]/+page.ts", DETAIL_LOAD, LOADER_DEPS),
        ("[table]/[id]/+page.svelte", DETAIL_PAGE, &[][..]),
        ("+layout.ts", LAYOUT_LOAD, &["sveltekite", "$lib/generated/db.js"][..]),
        (
            "+layout.svelte",
            LAYOUT_PAGE,
            &["$lib/generated/db.js", "$lib/generated/data.js"][..],
        ),
    ]
    .into_iter()
    .map(|(path, content, dependencies)| {
        CodeArtifact::new(
            format!("{ROUTES_DIR}/{path}"),
            ArtifactKind::Route,
            content.to_string(),
        )
        .with_dependencies(dependencies.iter().map(|dep| dep.to_string()).collect())
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_six_route_files() {
        let paths: Vec<String> = route_files()
            .into_iter()
            .map(|artifact| artifact.target_path)
            .collect();
        assert_eq!(
            paths,
            [
                "src/routes/[table]/+page.ts",
                "src/routes/[table]/+page.svelte",
                "src/routes/[table]/[id]/+page.ts",
                "src/routes/[table]/[id]/+page.svelte",
                "src/routes/+layout.ts",
                "src/routes/+layout.svelte",
            ]
        );
    }

    #[test]
    fn layout_installs_storage_handle() {
        let layout = route_files()
            .into_iter()
            .find(|artifact| artifact.target_path == "src/routes/+layout.ts")
            .expect("layout load");
        assert!(layout.content.contains("setDB(db)"));
        assert!(layout.content.contains("export const ssr = false"));
    }

    #[test]
    fn navigation_lists_entity_tables_only() {
        let layout = route_files()
            .into_iter()
            .find(|artifact| artifact.target_path == "src/routes/+layout.svelte")
            .expect("layout page");
        assert!(layout.content.contains("Object.keys(constructors)"));
        assert!(layout.content.contains("{#each entityTables as name}"));
        assert!(!layout.content.contains("includes('_')"));
        assert!(
            layout
                .dependencies
                .contains(&"$lib/generated/data.js".to_string())
        );
    }
}
