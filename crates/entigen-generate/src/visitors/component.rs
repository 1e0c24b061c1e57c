use std::collections::{BTreeSet, HashMap};

use serde_json::{Value, json};

use entigen_core::naming;
use entigen_core::{EntityConfig, FieldKind, RelationKind, Schema};

use crate::catalog::{RelationContext, Side, requirements_for};
use crate::model::{ArtifactKind, CodeArtifact, ComponentKind, GENERATED_DIR};
use crate::template::TemplateEngine;
use crate::visitors::SchemaVisitor;

const DETAIL_TEMPLATE: &str = "<script lang=\"ts\">
   // @ts-nocheck
   import { type __CLASS_NAME__ } from '$lib/generated/classes/__CLASS_NAME__.svelte.js'

   let { __ENTITY_NAME__ }: { __ENTITY_NAME__: __CLASS_NAME__ } = $props()
</script>

__FIELD_INPUTS__

__RELATION_SELECTORS__
";

const LIST_ITEM_TEMPLATE: &str = "<script lang=\"ts\">
   import { type __CLASS_NAME__ } from '$lib/generated/classes/__CLASS_NAME__.svelte.js'

   let { __ENTITY_NAME__ }: { __ENTITY_NAME__: __CLASS_NAME__ } = $props()
</script>

<span>{__ENTITY_NAME__.data.__DISPLAY_FIELD__}</span>
";

const SELECT_TEMPLATE: &str = "<script lang=\"ts\">
   import { type __SCHEMA_TYPE__ } from \"$lib/generated/data.js\";

   type SelectEvent = Event & { currentTarget: EventTarget & HTMLSelectElement }

   let { __ENTITY_PLURAL__, callback }: { __ENTITY_PLURAL__: __SCHEMA_TYPE__[], callback: (id: string) => void } = $props()
</script>

<select onchange={(event: SelectEvent) => callback(event.currentTarget.value)}>
   <option selected value='' disabled>Select __ENTITY_DISPLAY_NAME__</option>
   {#each __ENTITY_PLURAL__ as __ENTITY_NAME__}
      <option value={__ENTITY_NAME__.id}>{__ENTITY_NAME__.__DISPLAY_FIELD__}</option>
   {/each}
</select>
";

const LIST_TEMPLATE: &str = "<script lang=\"ts\">
   import { type __SCHEMA_TYPE__ } from \"$lib/generated/data.js\";

   let { __ENTITY_PLURAL__, remove }: { __ENTITY_PLURAL__: __SCHEMA_TYPE__[], remove: (id: string) => void } = $props()
</script>

{#each __ENTITY_PLURAL__ as __ENTITY_NAME__}
   <span __STYLE_ATTRIBUTE__>
      {__ENTITY_NAME__.__DISPLAY_FIELD__}
      <button onclick={() => remove(__ENTITY_NAME__.id)}>×</button>
   </span>
{/each}
";

const DELETE_TEMPLATE: &str = "<script lang=\"ts\">
   import { type __CLASS_NAME__ } from '$lib/generated/classes/__CLASS_NAME__.svelte.js'

   let { __ENTITY_NAME__ }: { __ENTITY_NAME__: __CLASS_NAME__ } = $props()

   function handleDelete() {
      if (confirm('Are you sure you want to delete this __ENTITY_DISPLAY_NAME__?')) {
         __ENTITY_NAME__.delete()
      }
   }
</script>

<button onclick={handleDelete} class=\"delete-button\">
   Delete __ENTITY_DISPLAY_NAME__
</button>

<style>
   .delete-button {
      background-color: #dc3545;
      color: white;
      border: none;
      padding: 0.5rem 1rem;
      border-radius: 0.25rem;
      cursor: pointer;
   }

   .delete-button:hover {
      background-color: #c82333;
   }
</style>
";

const PLAIN_CHIP_STYLE: &str =
    "style=\"padding: 0.25em .5em; border-radius: 0.25em; background-color: #f0f0f0;\"";

/// Emits the Svelte components of each entity.
///
/// Built from the whole schema: an entity needs a `List` or `Delete`
/// component when some other entity's relation points at it.
#[derive(Debug, Clone, Default)]
pub struct ComponentVisitor {
    engine: TemplateEngine,
    required: HashMap<String, BTreeSet<ComponentKind>>,
}

impl ComponentVisitor {
    pub fn new(schema: &Schema) -> Self {
        let mut required: HashMap<String, BTreeSet<ComponentKind>> = HashMap::new();

        for (source, relation) in schema.relations() {
            let requirements = requirements_for(relation.kind);
            required
                .entry(relation.target.clone())
                .or_default()
                .extend(requirements.components_on(Side::Target));
            required
                .entry(source.name.clone())
                .or_default()
                .extend(requirements.components_on(Side::Source));
        }

        Self {
            engine: TemplateEngine::new(),
            required,
        }
    }

    /// Component kinds generated for `entity`, in output order.
    pub fn component_kinds(&self, entity: &EntityConfig) -> BTreeSet<ComponentKind> {
        let mut kinds: BTreeSet<ComponentKind> = ComponentKind::BASELINE.into_iter().collect();
        if let Some(required) = self.required.get(&entity.name) {
            kinds.extend(required.iter().copied());
        }
        kinds
    }

    pub fn component_artifact(&self, entity: &EntityConfig, kind: ComponentKind) -> CodeArtifact {
        let class_name = entity.class_name();
        let entity_lower = entity.instance_name();
        let component_name = format!("{class_name}{}", kind.suffix());

        let template = match kind {
            ComponentKind::Detail => DETAIL_TEMPLATE,
            ComponentKind::ListItem => LIST_ITEM_TEMPLATE,
            ComponentKind::Select => SELECT_TEMPLATE,
            ComponentKind::List => LIST_TEMPLATE,
            ComponentKind::Delete => DELETE_TEMPLATE,
        };
        let content = self.engine.render(template, &component_context(entity, kind));

        let mut dependencies = vec![
            "sveltekite".to_string(),
            format!("../classes/{class_name}"),
        ];
        if kind == ComponentKind::Detail {
            for relation in entity.relations.values() {
                let dependency = format!("../{}", naming::instance_name(&relation.target));
                if !dependencies.contains(&dependency) {
                    dependencies.push(dependency);
                }
            }
        }

        CodeArtifact::new(
            format!("{GENERATED_DIR}/components/{entity_lower}/{component_name}.svelte"),
            ArtifactKind::Component,
            content,
        )
        .with_dependencies(dependencies)
    }
}

impl SchemaVisitor for ComponentVisitor {
    fn visit_entity(&self, entity: &EntityConfig) -> Vec<CodeArtifact> {
        self.component_kinds(entity)
            .into_iter()
            .map(|kind| self.component_artifact(entity, kind))
            .collect()
    }
}

fn component_context(entity: &EntityConfig, kind: ComponentKind) -> Value {
    let entity_lower = entity.instance_name();
    let mut context = json!({
        "CLASS_NAME": entity.class_name(),
        "SCHEMA_TYPE": entity.schema_type_name(),
        "ENTITY_NAME": entity_lower,
        "ENTITY_PLURAL": naming::plural(&entity_lower),
        "ENTITY_DISPLAY_NAME": entity.class_name(),
        "DISPLAY_FIELD": entity.display_field(),
    });

    let extra = match kind {
        ComponentKind::Detail => json!({
            "FIELD_INPUTS": field_inputs(entity),
            "RELATION_SELECTORS": relation_selectors(entity),
        }),
        ComponentKind::List => json!({ "STYLE_ATTRIBUTE": chip_style(entity) }),
        ComponentKind::ListItem | ComponentKind::Select | ComponentKind::Delete => json!({}),
    };
    if let (Some(context), Value::Object(extra)) = (context.as_object_mut(), extra) {
        context.extend(extra);
    }
    context
}

fn field_inputs(entity: &EntityConfig) -> String {
    let entity_lower = entity.instance_name();
    entity
        .editable_fields()
        .map(|(name, field)| match field.kind {
            FieldKind::Text => format!(
                "<label for=\"{name}\">{label}</label><br />\n<textarea name=\"{name}\" bind:value={{{entity_lower}.data.{name}}} rows=\"10\" cols=\"40\"></textarea>",
                label = naming::capitalize(name)
            ),
            FieldKind::Color => {
                format!("<input type=\"color\" bind:value={{{entity_lower}.data.{name}}} />")
            }
            _ => format!("<input type=\"text\" bind:value={{{entity_lower}.data.{name}}} />"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn relation_selectors(entity: &EntityConfig) -> String {
    let entity_lower = entity.instance_name();
    entity
        .relations
        .iter()
        .map(|(name, relation)| {
            let target_class = naming::class_name(&relation.target);
            match relation.kind {
                RelationKind::BelongsTo => {
                    let accessor =
                        RelationContext::for_relation(entity, name, relation).accessor();
                    format!(
                        "<{entity_lower}.select{accessor} callback={{{entity_lower}.update{accessor}}} />"
                    )
                }
                RelationKind::HasMany | RelationKind::ManyToMany => format!(
                    "<div>\n   <{entity_lower}.{name} /><br />\n   Add {target_class}: <{entity_lower}.select{pascal} callback={{{entity_lower}.add{target_class}}} />\n</div>",
                    pascal = naming::capitalize(name)
                ),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chip style for `List`: tinted by the first color field when there is one.
fn chip_style(entity: &EntityConfig) -> String {
    let color_field = entity
        .fields
        .iter()
        .find(|(_, field)| field.kind == FieldKind::Color)
        .map(|(name, _)| name);

    match color_field {
        Some(field) => format!(
            "style={{`color: black; background-color: ${{{}.{field} || 'grey'}}; padding: 0.25em .5em; border-radius: 0.25em;`}}",
            entity.instance_name()
        ),
        None => PLAIN_CHIP_STYLE.to_string(),
    }
}
