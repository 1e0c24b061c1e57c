//! `__TOKEN__` substitution over a JSON context.
//!
//! Tokens are upper snake case wrapped in double underscores. A token is
//! resolved against the context by its exact key first, then by its
//! lower-camel-case key. A `__` inside a token separates path segments, so
//! `__ENTITY__CLASS_NAME__` reads `entity.className`. Tokens that resolve to
//! nothing, to `null` or to a non-scalar value are left in place.

use std::sync::OnceLock;

use indexmap::IndexSet;
use regex::{Captures, Regex};
use serde_json::Value;

/// Marker line stripped from every template before substitution.
const TS_NOCHECK: &str = "// @ts-nocheck";

/// Context keys used by the built-in templates. They are resolved from this
/// table before the generic case conversion.
const KEY_EXCEPTIONS: [(&str, &str); 14] = [
    ("CLASS_NAME", "className"),
    ("ENTITY_NAME", "entityName"),
    ("TARGET", "target"),
    ("TARGET_LOWER", "targetLower"),
    ("SOURCE", "source"),
    ("SOURCE_LOWER", "sourceLower"),
    ("SCHEMA_TYPE", "schemaType"),
    ("FOREIGN_KEY", "foreignKey"),
    ("JOIN_TABLE", "joinTable"),
    ("RELATION_NAME", "relationName"),
    ("FIELD_DEFINITIONS", "fieldDefinitions"),
    ("DEFAULT_DATA", "defaultData"),
    ("IMPORTS", "imports"),
    ("METHODS", "methods"),
];

fn token_pattern() -> Option<&'static Regex> {
    static TOKEN: OnceLock<Option<Regex>> = OnceLock::new();
    TOKEN
        .get_or_init(|| Regex::new(r"__([A-Z](?:[A-Z0-9_]*[A-Z0-9])?)__").ok())
        .as_ref()
}

/// Stateless template renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn new() -> Self {
        Self
    }

    /// Render `template` against `context`.
    pub fn render(&self, template: &str, context: &Value) -> String {
        let cleaned = strip_ts_nocheck(template);
        substitute(&cleaned, |token| lookup(context, token).and_then(render_scalar))
    }
}

/// Replace every token `resolve` knows, in a single pass over `template`.
pub(crate) fn substitute(template: &str, resolve: impl Fn(&str) -> Option<String>) -> String {
    let Some(pattern) = token_pattern() else {
        return template.to_string();
    };

    pattern
        .replace_all(template, |caps: &Captures<'_>| {
            resolve(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Drop every line that holds only the `// @ts-nocheck` marker, wherever it
/// is indented.
pub fn strip_ts_nocheck(template: &str) -> String {
    template
        .split_inclusive('\n')
        .filter(|line| {
            line.trim_start()
                .strip_prefix(TS_NOCHECK)
                .is_none_or(|rest| !rest.trim().is_empty())
        })
        .collect()
}

fn lookup<'a>(context: &'a Value, token: &str) -> Option<&'a Value> {
    if let Some(value) = context.get(token) {
        return Some(value);
    }

    token
        .split("__")
        .try_fold(context, |current, segment| current.get(context_key(segment)))
}

/// Context key for one token segment (`TARGET_LOWER` -> `targetLower`).
pub fn context_key(segment: &str) -> String {
    if let Some((_, key)) = KEY_EXCEPTIONS.iter().find(|(token, _)| *token == segment) {
        return (*key).to_string();
    }

    let mut key = String::with_capacity(segment.len());
    for (index, word) in segment.split('_').filter(|word| !word.is_empty()).enumerate() {
        let word = word.to_lowercase();
        if index == 0 {
            key.push_str(&word);
        } else {
            key.push_str(&entigen_core::naming::capitalize(&word));
        }
    }
    key
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// How an import line binds its names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportStyle {
    /// `import { a, b } from '...'`
    Named,
    /// `import type { A } from '...'`
    TypeOnly,
    /// `import A from '...'`, used for Svelte components.
    Default,
}

/// One rendered `import` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportLine {
    pub names: String,
    pub from: String,
    pub style: ImportStyle,
}

impl ImportLine {
    pub fn new(names: impl Into<String>, from: impl Into<String>, style: ImportStyle) -> Self {
        Self {
            names: names.into(),
            from: from.into(),
            style,
        }
    }

    pub fn render(&self) -> String {
        match self.style {
            ImportStyle::Named => format!("import {{ {} }} from '{}'", self.names, self.from),
            ImportStyle::TypeOnly => {
                format!("import type {{ {} }} from '{}'", self.names, self.from)
            }
            ImportStyle::Default => format!("import {} from '{}'", self.names, self.from),
        }
    }
}

/// Render import lines, dropping repeats; the first occurrence wins.
pub fn render_imports<'a>(imports: impl IntoIterator<Item = &'a ImportLine>) -> String {
    let lines: IndexSet<String> = imports.into_iter().map(ImportLine::render).collect();
    lines.into_iter().collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn replaces_exact_and_camel_case_keys() {
        let engine = TemplateEngine::new();
        let context = json!({ "CLASS_NAME": "Post", "entityName": "post" });
        assert_eq!(
            engine.render("class __CLASS_NAME__ { __ENTITY_NAME__ }", &context),
            "class Post { post }"
        );
    }

    #[test]
    fn unresolved_tokens_stay_verbatim() {
        let engine = TemplateEngine::new();
        let context = json!({ "present": null, "list": ["a"] });
        let template = "__MISSING__ __PRESENT__ __LIST__";
        assert_eq!(engine.render(template, &context), template);
    }

    #[test]
    fn double_underscore_separates_path_segments() {
        let engine = TemplateEngine::new();
        let context = json!({ "entity": { "className": "Tag", "fieldCount": 3 } });
        assert_eq!(
            engine.render("__ENTITY__CLASS_NAME__/__ENTITY__FIELD_COUNT__", &context),
            "Tag/3"
        );
    }

    #[test]
    fn leading_underscore_is_kept_outside_the_token() {
        let engine = TemplateEngine::new();
        let context = json!({ "relationName": "tags" });
        assert_eq!(
            engine.render("this.___RELATION_NAME__ = []", &context),
            "this._tags = []"
        );
    }

    #[test]
    fn suffixes_after_tokens_are_preserved() {
        let engine = TemplateEngine::new();
        let context = json!({ "className": "Tag", "sourceLower": "post" });
        assert_eq!(
            engine.render("__CLASS_NAME__Schema { __SOURCE_LOWER__Id }", &context),
            "TagSchema { postId }"
        );
    }

    #[test]
    fn ts_nocheck_lines_are_removed() {
        let engine = TemplateEngine::new();
        let template = "// @ts-nocheck\n<script>\n   // @ts-nocheck  \n   let a = 1\n</script>\n";
        assert_eq!(
            engine.render(template, &json!({})),
            "<script>\n   let a = 1\n</script>\n"
        );
    }

    #[test]
    fn ts_nocheck_with_trailing_code_is_kept() {
        let template = "// @ts-nocheck but keep me\n";
        assert_eq!(strip_ts_nocheck(template), template);
    }

    #[test]
    fn context_keys_use_lower_camel_case() {
        assert_eq!(context_key("RELATION_STATE_FIELDS"), "relationStateFields");
        assert_eq!(context_key("DISPLAY_FIELD"), "displayField");
        assert_eq!(context_key("TARGET_LOWER"), "targetLower");
    }

    #[test]
    fn imports_are_deduplicated_in_order() {
        let imports = [
            ImportLine::new("PostSchema", "../schema.js", ImportStyle::TypeOnly),
            ImportLine::new("TagList", "../components/tag/TagList.svelte", ImportStyle::Default),
            ImportLine::new("PostSchema", "../schema.js", ImportStyle::TypeOnly),
            ImportLine::new("BaseDB", "sveltekite", ImportStyle::Named),
        ];
        assert_eq!(
            render_imports(&imports),
            "import type { PostSchema } from '../schema.js'\n\
             import TagList from '../components/tag/TagList.svelte'\n\
             import { BaseDB } from 'sveltekite'"
        );
    }
}
