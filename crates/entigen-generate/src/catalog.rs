//! Per relation kind: the components, class methods, imports and state fields
//! a relation implies.
//!
//! Templates use the relation tokens `SOURCE`, `SOURCE_LOWER`, `TARGET`,
//! `TARGET_LOWER`, `TARGET_SCHEMA`, `ACCESSOR`, `RELATION_NAME`,
//! `RELATION_PASCAL`, `FOREIGN_KEY`, `JOIN_TABLE` and `JOIN_KEY`, resolved by
//! [`process_template`].

use entigen_core::naming;
use entigen_core::{EntityConfig, RelationConfig, RelationKind};

use crate::model::ComponentKind;
use crate::template::{ImportLine, ImportStyle, substitute};

/// Which end of a relation a requirement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Target,
}

/// A component that must exist on one end of the relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentRequirement {
    pub kind: ComponentKind,
    pub side: Side,
}

/// A method generated on the source entity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodRequirement {
    pub name: &'static str,
    pub template: &'static str,
}

/// A module the source entity class imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportRequirement {
    pub component: &'static str,
    pub from: &'static str,
    pub style: ImportStyle,
}

/// A reactive cache field added to the source entity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRequirement {
    pub name: &'static str,
    pub type_name: &'static str,
}

/// Everything a relation kind contributes to generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationRequirements {
    pub components: &'static [ComponentRequirement],
    pub methods: &'static [MethodRequirement],
    pub imports: &'static [ImportRequirement],
    pub fields: &'static [FieldRequirement],
}

impl RelationRequirements {
    pub const EMPTY: RelationRequirements = RelationRequirements {
        components: &[],
        methods: &[],
        imports: &[],
        fields: &[],
    };

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
            && self.methods.is_empty()
            && self.imports.is_empty()
            && self.fields.is_empty()
    }

    /// Components this relation requires on `side`.
    pub fn components_on(&self, side: Side) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components
            .iter()
            .filter(move |requirement| requirement.side == side)
            .map(|requirement| requirement.kind)
    }
}

const CACHE_FIELD: FieldRequirement = FieldRequirement {
    name: "___RELATION_NAME__",
    type_name: "__TARGET_SCHEMA__[]",
};

const BELONGS_TO: RelationRequirements = RelationRequirements {
    components: &[
        ComponentRequirement {
            kind: ComponentKind::Select,
            side: Side::Target,
        },
        ComponentRequirement {
            kind: ComponentKind::ListItem,
            side: Side::Target,
        },
    ],
    methods: &[MethodRequirement {
        name: "update__ACCESSOR__",
        template: "   update__ACCESSOR__ = (id: string) => {
      this.data.__FOREIGN_KEY__ = id
   }",
    }],
    imports: &[
        ImportRequirement {
            component: "__TARGET__Select",
            from: "../components/__TARGET_LOWER__/__TARGET__Select.svelte",
            style: ImportStyle::Default,
        },
        ImportRequirement {
            component: "__TARGET__ListItem",
            from: "../components/__TARGET_LOWER__/__TARGET__ListItem.svelte",
            style: ImportStyle::Default,
        },
        ImportRequirement {
            component: "__TARGET__",
            from: "./__TARGET__.svelte.js",
            style: ImportStyle::Named,
        },
    ],
    fields: &[],
};

const HAS_MANY: RelationRequirements = RelationRequirements {
    components: &[
        ComponentRequirement {
            kind: ComponentKind::List,
            side: Side::Target,
        },
        ComponentRequirement {
            kind: ComponentKind::Select,
            side: Side::Target,
        },
    ],
    methods: &[
        MethodRequirement {
            name: "refresh__RELATION_PASCAL__",
            template: "   refresh__RELATION_PASCAL__ = async () => {
      this.___RELATION_NAME__ = await this.db.filter('__TARGET_LOWER__')({ __FOREIGN_KEY__: this.data.id })
   }",
        },
        MethodRequirement {
            name: "add__TARGET__",
            template: "   add__TARGET__ = async (id: string) => {
      const record = await this.db.get('__TARGET_LOWER__')(id)
      if (record) await this.db.put('__TARGET_LOWER__')({ ...record, __FOREIGN_KEY__: this.data.id })
      this.refresh__RELATION_PASCAL__()
   }",
        },
        MethodRequirement {
            name: "remove__TARGET__",
            template: "   remove__TARGET__ = async (id: string) => {
      const record = await this.db.get('__TARGET_LOWER__')(id)
      if (record) await this.db.put('__TARGET_LOWER__')({ ...record, __FOREIGN_KEY__: '' })
      this.refresh__RELATION_PASCAL__()
   }",
        },
    ],
    imports: &[
        ImportRequirement {
            component: "__TARGET__List",
            from: "../components/__TARGET_LOWER__/__TARGET__List.svelte",
            style: ImportStyle::Default,
        },
        ImportRequirement {
            component: "__TARGET__Select",
            from: "../components/__TARGET_LOWER__/__TARGET__Select.svelte",
            style: ImportStyle::Default,
        },
    ],
    fields: &[CACHE_FIELD],
};

const MANY_TO_MANY: RelationRequirements = RelationRequirements {
    components: &[
        ComponentRequirement {
            kind: ComponentKind::List,
            side: Side::Target,
        },
        ComponentRequirement {
            kind: ComponentKind::Select,
            side: Side::Target,
        },
        ComponentRequirement {
            kind: ComponentKind::Delete,
            side: Side::Target,
        },
    ],
    methods: &[
        MethodRequirement {
            name: "refresh__RELATION_PASCAL__",
            template: "   refresh__RELATION_PASCAL__ = async () => {
      this.___RELATION_NAME__ = await this.db.join('__SOURCE_LOWER__')('__TARGET_LOWER__')({ __SOURCE_LOWER__Id: this.data.id })
   }",
        },
        MethodRequirement {
            name: "add__TARGET__",
            template: "   add__TARGET__ = (id: string) => {
      const __SOURCE_LOWER__Id = this.data.id
      const __TARGET_LOWER__Id = id
      const joinRecord = { __SOURCE_LOWER__Id, __TARGET_LOWER__Id }
      this.db.put('__JOIN_TABLE__')(joinRecord)
      this.refresh__RELATION_PASCAL__()
   }",
        },
        MethodRequirement {
            name: "remove__TARGET__",
            template: "   remove__TARGET__ = (id: string) => {
      const __SOURCE_LOWER__Id = this.data.id
      const __TARGET_LOWER__Id = id
      this.db.del('__JOIN_TABLE__')([__JOIN_KEY__])
      this.refresh__RELATION_PASCAL__()
   }",
        },
    ],
    imports: &[
        ImportRequirement {
            component: "__TARGET__List",
            from: "../components/__TARGET_LOWER__/__TARGET__List.svelte",
            style: ImportStyle::Default,
        },
        ImportRequirement {
            component: "__TARGET__Select",
            from: "../components/__TARGET_LOWER__/__TARGET__Select.svelte",
            style: ImportStyle::Default,
        },
    ],
    fields: &[CACHE_FIELD],
};

/// Requirements for a relation kind by name.
///
/// Accepts both naming schemes (`belongsTo`/`manyToOne`,
/// `hasMany`/`oneToMany`, `manyToMany`); anything else yields
/// [`RelationRequirements::EMPTY`].
pub fn requirements(kind: &str) -> &'static RelationRequirements {
    match kind {
        "belongsTo" | "manyToOne" => &BELONGS_TO,
        "hasMany" | "oneToMany" => &HAS_MANY,
        "manyToMany" => &MANY_TO_MANY,
        _ => &RelationRequirements::EMPTY,
    }
}

pub fn requirements_for(kind: RelationKind) -> &'static RelationRequirements {
    requirements(kind.as_str())
}

/// Names a relation template is rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationContext {
    pub source_entity: String,
    pub target_entity: String,
    pub relation_name: String,
    pub foreign_key: Option<String>,
    pub join_table: Option<String>,
    /// Suffix of the belongsTo `update`/`select` members when the target
    /// alone does not identify the relation.
    pub accessor: Option<String>,
}

impl RelationContext {
    pub fn new(
        source_entity: impl Into<String>,
        target_entity: impl Into<String>,
        relation_name: impl Into<String>,
    ) -> Self {
        Self {
            source_entity: source_entity.into(),
            target_entity: target_entity.into(),
            relation_name: relation_name.into(),
            foreign_key: None,
            join_table: None,
            accessor: None,
        }
    }

    pub fn for_relation(source: &EntityConfig, name: &str, relation: &RelationConfig) -> Self {
        let shares_target = relation.kind == RelationKind::BelongsTo
            && source
                .relations
                .iter()
                .any(|(other_name, other)| {
                    other_name != name
                        && other.kind == RelationKind::BelongsTo
                        && other.target == relation.target
                });

        Self {
            foreign_key: relation.foreign_key.clone(),
            join_table: relation.join_table.clone(),
            accessor: shares_target
                .then(|| naming::capitalize(naming::relation_display_name(name))),
            ..Self::new(source.name.as_str(), relation.target.as_str(), name)
        }
    }

    /// Suffix naming the belongsTo members of this relation: the target class,
    /// or the relation's display name when several relations share a target.
    pub fn accessor(&self) -> String {
        self.accessor
            .clone()
            .unwrap_or_else(|| naming::class_name(&self.target_entity))
    }

    fn source_lower(&self) -> String {
        naming::instance_name(&self.source_entity)
    }

    fn target_lower(&self) -> String {
        naming::instance_name(&self.target_entity)
    }

    /// Join-table key in the table's own column order.
    fn join_key(&self) -> String {
        let mut columns = [
            naming::foreign_key_column(&self.source_entity),
            naming::foreign_key_column(&self.target_entity),
        ];
        columns.sort();
        columns.join(", ")
    }

    fn resolve(&self, token: &str) -> Option<String> {
        let value = match token {
            "SOURCE" => naming::class_name(&self.source_entity),
            "SOURCE_LOWER" => self.source_lower(),
            "TARGET" => naming::class_name(&self.target_entity),
            "TARGET_LOWER" => self.target_lower(),
            "TARGET_SCHEMA" => naming::schema_type_name(&self.target_entity),
            "ACCESSOR" => self.accessor(),
            "RELATION_NAME" => self.relation_name.clone(),
            "RELATION_PASCAL" => naming::capitalize(&self.relation_name),
            "FOREIGN_KEY" => self
                .foreign_key
                .clone()
                .unwrap_or_else(|| naming::foreign_key_column(&self.target_entity)),
            "JOIN_TABLE" => self
                .join_table
                .clone()
                .unwrap_or_else(|| naming::join_table_name(&self.source_entity, &self.target_entity)),
            "JOIN_KEY" => self.join_key(),
            _ => return None,
        };
        Some(value)
    }
}

impl ImportRequirement {
    pub fn render(&self, context: &RelationContext) -> ImportLine {
        ImportLine::new(
            process_template(self.component, context),
            process_template(self.from, context),
            self.style,
        )
    }
}

/// Substitute relation tokens in `template`, leaving unknown tokens as-is.
pub fn process_template(template: &str, context: &RelationContext) -> String {
    substitute(template, |token| context.resolve(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_tags() -> RelationContext {
        RelationContext::new("Post", "Tag", "tags")
    }

    #[test]
    fn aliases_share_requirements() {
        assert_eq!(requirements("belongsTo"), requirements("manyToOne"));
        assert_eq!(requirements("hasMany"), requirements("oneToMany"));
        assert_eq!(
            requirements_for(RelationKind::ManyToMany),
            requirements("manyToMany")
        );
    }

    #[test]
    fn unknown_kind_is_empty() {
        assert!(requirements("oneToOne").is_empty());
        assert!(requirements("").is_empty());
    }

    #[test]
    fn substitutes_every_relation_token() {
        let rendered = process_template(
            "__SOURCE__ __SOURCE_LOWER__ __TARGET__ __TARGET_LOWER__ __RELATION_NAME__ \
             __RELATION_PASCAL__ __FOREIGN_KEY__ __JOIN_TABLE__",
            &post_tags(),
        );
        assert_eq!(rendered, "Post post Tag tag tags Tags tagId post_tag");
    }

    #[test]
    fn result_does_not_depend_on_token_order() {
        let context = post_tags();
        assert_eq!(
            process_template("__TARGET_LOWER__/__TARGET__", &context),
            "tag/Tag"
        );
        assert_eq!(
            process_template("__TARGET__/__TARGET_LOWER__", &context),
            "Tag/tag"
        );
    }

    #[test]
    fn unknown_tokens_are_left_alone() {
        assert_eq!(
            process_template("__CLASS_NAME__ __TARGET__", &post_tags()),
            "__CLASS_NAME__ Tag"
        );
    }

    #[test]
    fn explicit_keys_win_over_fallbacks() {
        let mut context = RelationContext::new("Post", "User", "author");
        context.foreign_key = Some("authorId".to_string());
        context.join_table = Some("custom".to_string());
        assert_eq!(
            process_template("__FOREIGN_KEY__ __JOIN_TABLE__", &context),
            "authorId custom"
        );
    }

    #[test]
    fn join_key_follows_table_column_order() {
        let context = RelationContext::new("Tag", "Post", "posts");
        assert_eq!(process_template("[__JOIN_KEY__]", &context), "[postId, tagId]");
    }

    #[test]
    fn many_to_many_refresh_matches_constructor_call() {
        let method = &requirements_for(RelationKind::ManyToMany).methods[0];
        let context = post_tags();
        assert_eq!(process_template(method.name, &context), "refreshTags");
        assert!(process_template(method.template, &context).contains("this._tags = await"));
    }

    #[test]
    fn collection_kinds_require_target_list() {
        for kind in [RelationKind::HasMany, RelationKind::ManyToMany] {
            let target: Vec<_> = requirements_for(kind).components_on(Side::Target).collect();
            assert!(target.contains(&ComponentKind::List), "{kind}");
        }
        assert_eq!(
            requirements_for(RelationKind::BelongsTo)
                .components_on(Side::Source)
                .count(),
            0
        );
    }

    #[test]
    fn shared_belongs_to_targets_get_distinct_accessors() {
        let schema = entigen_core::parse_schema(
            "User: {}\nPost:\n  authorId: User\n  editorId: User\n  category: Category\nCategory: {}\n",
        )
        .expect("parse schema");
        let post = schema.entity("Post").expect("post");
        let update = &requirements_for(RelationKind::BelongsTo).methods[0];

        let rendered: Vec<String> = post
            .relations
            .iter()
            .map(|(name, relation)| {
                let context = RelationContext::for_relation(post, name, relation);
                process_template(update.template, &context)
            })
            .collect();
        assert!(rendered[0].starts_with("   updateAuthor = (id: string) => {"));
        assert!(rendered[0].contains("this.data.authorId = id"));
        assert!(rendered[1].starts_with("   updateEditor = (id: string) => {"));
        assert!(rendered[1].contains("this.data.editorId = id"));
        assert!(rendered[2].starts_with("   updateCategory = (id: string) => {"));
    }
}
