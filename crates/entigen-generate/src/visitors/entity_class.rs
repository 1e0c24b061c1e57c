use indexmap::{IndexMap, IndexSet};
use serde_json::json;

use entigen_core::naming;
use entigen_core::{EntityConfig, FieldFormat, FieldKind, ID_FIELD, RelationKind};

use crate::catalog::{RelationContext, process_template, requirements_for};
use crate::model::{ArtifactKind, CodeArtifact, ComponentKind, GENERATED_DIR};
use crate::template::{ImportLine, ImportStyle, TemplateEngine, render_imports};
use crate::visitors::SchemaVisitor;

const ENTITY_CLASS_TEMPLATE: &str = "__IMPORTS__

export class __CLASS_NAME__ extends BaseDB {
   public data = $state<__SCHEMA_TYPE__>(__DEFAULT_DATA__)
__RELATION_STATE_FIELDS__
   constructor(data?: __SCHEMA_TYPE__) {
      super()
      if (data) this.data = data
__CONSTRUCTOR_CALLS__   }

__MEMBERS__

   get snapshot() {
      return $state.snapshot(this.data)
   }

   get db() {
      return this.getDB()
   }

   delete() {
      return this.db.del('__ENTITY_NAME__')(this.data.id)
   }

   static create() {
      const __ENTITY_NAME__ = new __CLASS_NAME__()
      return __ENTITY_NAME__.db.put('__ENTITY_NAME__')(__ENTITY_NAME__.snapshot)
   }
}
";

const RUNTIME_HELPERS: &str = "BaseDB, DataSave, withData, withInstance, withProps, withSave";

/// Emits `classes/<Class>.svelte.ts` for each entity.
#[derive(Debug, Clone, Default)]
pub struct EntityClassVisitor {
    engine: TemplateEngine,
}

impl EntityClassVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_artifact(&self, entity: &EntityConfig) -> CodeArtifact {
        let class_name = entity.class_name();
        let entity_name = entity.instance_name();
        let members = Members::collect(entity);

        let context = json!({
            "className": class_name,
            "entityName": entity_name,
            "schemaType": entity.schema_type_name(),
            "imports": build_imports(entity),
            "defaultData": build_default_data(entity),
            "relationStateFields": build_state_fields(entity),
            "constructorCalls": build_constructor_calls(entity),
            "members": members.render(),
        });

        let content = self.engine.render(ENTITY_CLASS_TEMPLATE, &context);
        CodeArtifact::new(
            format!("{GENERATED_DIR}/classes/{class_name}.svelte.ts"),
            ArtifactKind::EntityClass,
            content,
        )
        .with_dependencies(dependencies(entity))
    }
}

impl SchemaVisitor for EntityClassVisitor {
    fn visit_entity(&self, entity: &EntityConfig) -> Vec<CodeArtifact> {
        vec![self.class_artifact(entity)]
    }
}

fn relation_contexts(
    entity: &EntityConfig,
) -> impl Iterator<Item = (&String, &entigen_core::RelationConfig, RelationContext)> {
    entity.relations.iter().map(move |(name, relation)| {
        (
            name,
            relation,
            RelationContext::for_relation(entity, name, relation),
        )
    })
}

fn build_imports(entity: &EntityConfig) -> String {
    let class_name = entity.class_name();
    let entity_lower = entity.instance_name();

    let schema_types: IndexSet<String> = std::iter::once(entity.schema_type_name())
        .chain(
            entity
                .collection_relations()
                .map(|(_, relation)| naming::schema_type_name(&relation.target)),
        )
        .collect();

    let mut imports = vec![
        ImportLine::new(
            schema_types.into_iter().collect::<Vec<_>>().join(", "),
            "../schema.js",
            ImportStyle::TypeOnly,
        ),
        ImportLine::new(RUNTIME_HELPERS, "sveltekite", ImportStyle::Named),
    ];
    for kind in [ComponentKind::Detail, ComponentKind::ListItem] {
        let component = format!("{class_name}{}", kind.suffix());
        imports.push(ImportLine::new(
            component.as_str(),
            format!("../components/{entity_lower}/{component}.svelte"),
            ImportStyle::Default,
        ));
    }

    for (_, relation, context) in relation_contexts(entity) {
        for requirement in requirements_for(relation.kind).imports {
            let line = requirement.render(&context);
            // The class never imports itself.
            if line.names != class_name {
                imports.push(line);
            }
        }
    }

    render_imports(&imports)
}

fn build_default_data(entity: &EntityConfig) -> String {
    let entity_lower = entity.instance_name();
    let entries: Vec<String> = entity
        .fields
        .iter()
        .map(|(name, field)| {
            let placeholder = name != ID_FIELD
                && matches!(field.kind, FieldKind::String | FieldKind::Text)
                && field.format != Some(FieldFormat::Email);
            if placeholder {
                format!("      {name}: 'new {entity_lower} {name}'")
            } else {
                format!("      {name}: {}", field.default_value)
            }
        })
        .collect();

    format!("{{\n{}\n   }}", entries.join(",\n"))
}

fn build_state_fields(entity: &EntityConfig) -> String {
    let fields: Vec<String> = relation_contexts(entity)
        .flat_map(|(_, relation, context)| {
            requirements_for(relation.kind).fields.iter().map(move |field| {
                format!(
                    "   {} = $state<{}>([])",
                    process_template(field.name, &context),
                    process_template(field.type_name, &context)
                )
            })
        })
        .collect();

    if fields.is_empty() {
        String::new()
    } else {
        format!("\n{}\n", fields.join("\n"))
    }
}

fn build_constructor_calls(entity: &EntityConfig) -> String {
    entity
        .collection_relations()
        .map(|(name, _)| format!("      this.refresh{}()\n", naming::capitalize(name)))
        .collect()
}

/// Class members keyed by name; a second member with a taken name is dropped.
#[derive(Default)]
struct Members {
    methods: IndexMap<String, String>,
    getters: IndexMap<String, String>,
}

impl Members {
    fn collect(entity: &EntityConfig) -> Self {
        let mut members = Self::default();
        let class_name = entity.class_name();
        let entity_lower = entity.instance_name();

        for (_, relation, context) in relation_contexts(entity) {
            for method in requirements_for(relation.kind).methods {
                members.method(
                    process_template(method.name, &context),
                    process_template(method.template, &context),
                );
            }
        }

        members.getter(
            "detail",
            format!(
                "withSave(DataSave, {class_name}Detail, {{ {entity_lower}: this }}, () => this.db.put('{entity_lower}')(this.snapshot))"
            ),
        );
        members.getter(
            "listItem",
            format!("withProps({class_name}ListItem, {{ {entity_lower}: this }})"),
        );

        for (name, relation, context) in relation_contexts(entity) {
            let target_class = naming::class_name(&relation.target);
            let target_lower = naming::instance_name(&relation.target);
            let target_plural = naming::plural(&target_lower);

            match relation.kind {
                RelationKind::BelongsTo => {
                    let foreign_key = relation
                        .foreign_key
                        .clone()
                        .unwrap_or_else(|| naming::foreign_key_column(&relation.target));
                    members.getter(
                        format!("select{}", context.accessor()),
                        format!(
                            "withData({target_class}Select, '{target_plural}', () => this.db.all('{target_lower}')) as any"
                        ),
                    );
                    members.getter(
                        naming::relation_display_name(name),
                        format!(
                            "withInstance({target_class}ListItem, '{target_lower}', () => this.db.get('{target_lower}')(this.data.{foreign_key}), {target_class}) as any"
                        ),
                    );
                }
                RelationKind::HasMany | RelationKind::ManyToMany => {
                    members.getter(
                        name.as_str(),
                        format!(
                            "withProps({target_class}List, {{ {target_plural}: this._{name}, remove: this.remove{target_class} }}) as any"
                        ),
                    );
                    members.getter(
                        format!("select{}", naming::capitalize(name)),
                        format!(
                            "withData({target_class}Select, '{target_plural}', () => this.db.all('{target_lower}')) as any"
                        ),
                    );
                }
            }
        }

        members
    }

    fn method(&mut self, name: String, body: String) {
        self.methods.entry(name).or_insert(body);
    }

    fn getter(&mut self, name: impl Into<String>, expression: String) {
        let name = name.into();
        if self.methods.contains_key(&name) {
            return;
        }
        let body = format!("   get {name}() {{\n      return {expression}\n   }}");
        self.getters.entry(name).or_insert(body);
    }

    fn render(&self) -> String {
        self.methods
            .values()
            .chain(self.getters.values())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn dependencies(entity: &EntityConfig) -> Vec<String> {
    let deps: IndexSet<String> = std::iter::once("sveltekite".to_string())
        .chain(entity.relations.values().map(|relation| {
            format!("../components/{}", naming::instance_name(&relation.target))
        }))
        .collect();
    deps.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use entigen_core::{RelationConfig, parse_schema};

    use super::*;

    const BLOG: &str = "User:\n  name: string\nTag:\n  name: string\n  color: color\nPost:\n  title: string\n  content: text\n  views: number\n  user: User\n  tags: [Tag]\n";

    fn render(yaml: &str, entity: &str) -> String {
        let schema = parse_schema(yaml).expect("parse schema");
        EntityClassVisitor::new()
            .class_artifact(schema.entity(entity).expect("entity"))
            .content
    }

    #[test]
    fn default_data_seeds_text_fields() {
        let content = render(BLOG, "Post");
        assert!(content.contains(
            "$state<PostSchema>({\n      id: crypto.randomUUID(),\n      title: 'new post title',\n      content: 'new post content',\n      views: 0,\n      userId: ''\n   })"
        ));
    }

    #[test]
    fn many_to_many_adds_cache_and_methods() {
        let content = render(BLOG, "Post");
        assert!(content.contains("   _tags = $state<TagSchema[]>([])"));
        assert!(content.contains("      this.refreshTags()\n   }"));
        assert!(content.contains("   refreshTags = async () => {"));
        assert!(content.contains("   addTag = (id: string) => {"));
        assert!(content.contains("this.db.put('post_tag')(joinRecord)"));
        assert!(content.contains("this.db.del('post_tag')([postId, tagId])"));
        assert!(content.contains("   get tags() {"));
        assert!(content.contains("   get selectTags() {"));
    }

    #[test]
    fn belongs_to_adds_update_and_display_getter() {
        let content = render(BLOG, "Post");
        assert!(content.contains("   updateUser = (id: string) => {\n      this.data.userId = id\n   }"));
        assert!(content.contains("   get selectUser() {"));
        assert!(content.contains("this.db.get('user')(this.data.userId), User) as any"));
        assert!(content.contains("import { User } from './User.svelte.js'"));
    }

    #[test]
    fn imports_are_unique_and_ordered() {
        let content = render(BLOG, "Post");
        let imports: Vec<&str> = content
            .lines()
            .take_while(|line| line.starts_with("import"))
            .collect();
        assert_eq!(
            imports,
            [
                "import type { PostSchema, TagSchema } from '../schema.js'",
                "import { BaseDB, DataSave, withData, withInstance, withProps, withSave } from 'sveltekite'",
                "import PostDetail from '../components/post/PostDetail.svelte'",
                "import PostListItem from '../components/post/PostListItem.svelte'",
                "import UserSelect from '../components/user/UserSelect.svelte'",
                "import UserListItem from '../components/user/UserListItem.svelte'",
                "import { User } from './User.svelte.js'",
                "import TagList from '../components/tag/TagList.svelte'",
                "import TagSelect from '../components/tag/TagSelect.svelte'",
            ]
        );
    }

    #[test]
    fn entity_without_relations_has_no_state_or_refresh() {
        let content = render(BLOG, "Tag");
        assert!(!content.contains("$state<TagSchema[]>"));
        assert!(!content.contains("refresh"));
        assert!(content.contains("      if (data) this.data = data\n   }"));
        assert!(content.contains("   delete() {\n      return this.db.del('tag')(this.data.id)\n   }"));
        assert!(content.contains("      const tag = new Tag()\n      return tag.db.put('tag')(tag.snapshot)"));
    }

    #[test]
    fn self_reference_does_not_import_itself() {
        let content = render("Category:\n  name: string\n  parentId: Category\n", "Category");
        assert!(!content.contains("import { Category }"));
        assert!(content.contains("   get parent() {"));
        assert_eq!(content.matches("import CategoryListItem").count(), 1);
    }

    #[test]
    fn has_many_uses_foreign_key_on_target() {
        let mut schema = parse_schema(BLOG).expect("parse schema");
        let user = schema.entities.get_mut("User").expect("user");
        user.relations
            .insert("posts".to_string(), RelationConfig::has_many("Post", "userId"));

        let content = EntityClassVisitor::new()
            .class_artifact(schema.entity("User").expect("user"))
            .content;
        assert!(content.contains("   _posts = $state<PostSchema[]>([])"));
        assert!(content.contains("this.db.filter('post')({ userId: this.data.id })"));
        assert!(content.contains("   addPost = async (id: string) => {"));
        assert!(content.contains("import PostList from '../components/post/PostList.svelte'"));
    }

    #[test]
    fn output_is_stable() {
        assert_eq!(render(BLOG, "Post"), render(BLOG, "Post"));
    }

    #[test]
    fn email_fields_start_empty() {
        let content = render("User:\n  name: string\n  email: email\n", "User");
        assert!(content.contains("      name: 'new user name',\n      email: ''\n   }"));
    }

    #[test]
    fn relations_sharing_a_target_assign_their_own_keys() {
        let content = render(
            "User:\n  name: string\nPost:\n  title: string\n  authorId: User\n  editorId: User\n",
            "Post",
        );
        assert!(content.contains("   updateAuthor = (id: string) => {\n      this.data.authorId = id\n   }"));
        assert!(content.contains("   updateEditor = (id: string) => {\n      this.data.editorId = id\n   }"));
        assert!(!content.contains("updateUser"));
        assert!(content.contains("   get selectAuthor() {"));
        assert!(content.contains("   get selectEditor() {"));
        assert!(content.contains("this.db.get('user')(this.data.authorId), User) as any"));
        assert!(content.contains("this.db.get('user')(this.data.editorId), User) as any"));
    }

    #[test]
    fn camel_case_entities_keep_inner_capitals_in_type_names() {
        let content = render(
            "BlogPost:\n  title: string\n  tags: [Tag]\nTag:\n  name: string\n",
            "BlogPost",
        );
        assert!(content.contains("import type { BlogPostSchema, TagSchema } from '../schema.js'"));
        assert!(content.contains("public data = $state<BlogPostSchema>("));
        assert!(content.contains("export class BlogPost extends BaseDB"));
    }
}
