use std::fs;
use std::path::PathBuf;

use entigen_core::{
    Error, FieldKind, RelationKind, build_relation_graph_report, parse_schema, validate_schema,
};

fn load_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture at {}", path.display()))
}

#[test]
fn blog_fixture_normalizes_and_validates() {
    let schema = parse_schema(&load_fixture("blog.yaml")).expect("parse blog fixture");
    validate_schema(&schema).expect("normalized schema is valid");

    let names: Vec<&str> = schema.entities.keys().map(String::as_str).collect();
    assert_eq!(names, ["User", "Category", "Post", "Tag"]);

    let post = schema.entity("Post").expect("post");
    let fields: Vec<&str> = post.fields.keys().map(String::as_str).collect();
    assert_eq!(
        fields,
        [
            "id",
            "title",
            "content",
            "published",
            "views",
            "publishedAt",
            "userId",
            "categoryId"
        ]
    );
    assert_eq!(post.fields["published"].default_value, "false");
    assert_eq!(post.fields["publishedAt"].default_value, "new Date().toISOString()");
    assert_eq!(post.fields["views"].kind, FieldKind::Number);
    assert_eq!(post.display_field(), "title");

    assert_eq!(post.relations["user"].foreign_key.as_deref(), Some("userId"));
    assert_eq!(
        post.relations["categoryId"].foreign_key.as_deref(),
        Some("categoryId")
    );
    assert_eq!(post.relations["tags"].kind, RelationKind::ManyToMany);

    let tag = schema.entity("Tag").expect("tag");
    assert!(tag.has_color_field());
    assert_eq!(tag.fields["color"].default_value, "''");
    assert!(tag.relations.is_empty());

    let joins: Vec<&str> = schema.join_tables.keys().map(String::as_str).collect();
    assert_eq!(joins, ["post_tag"]);
}

#[test]
fn join_tables_are_shared_between_both_sides() {
    let schema = parse_schema("Post:\n  tags: [Tag]\nTag:\n  posts: [Post]\n").expect("parse");
    assert_eq!(schema.join_tables.len(), 1);
    assert_eq!(
        schema.entity("Post").expect("post").relations["tags"].join_table,
        schema.entity("Tag").expect("tag").relations["posts"].join_table
    );
    validate_schema(&schema).expect("valid");
}

#[test]
fn foreign_key_naming_rules() {
    let schema = parse_schema("User: {}\nPost:\n  authorId: User\nComment:\n  author: User\n")
        .expect("parse");

    let post = schema.entity("Post").expect("post");
    assert_eq!(post.relations["authorId"].foreign_key.as_deref(), Some("authorId"));
    assert!(post.fields.contains_key("authorId"));
    assert!(!post.fields.contains_key("userId"));

    let comment = schema.entity("Comment").expect("comment");
    assert_eq!(comment.relations["author"].foreign_key.as_deref(), Some("userId"));
    assert_eq!(comment.fields["userId"].kind, FieldKind::Uuid);
}

#[test]
fn normalization_is_deterministic() {
    let yaml = load_fixture("blog.yaml");
    let first = parse_schema(&yaml).expect("first parse");
    let second = parse_schema(&yaml).expect("second parse");
    assert_eq!(first, second);
}

#[test]
fn shape_errors_name_entity_and_member() {
    let err = parse_schema("Post:\n  tags: [Tag, User]\nTag: {}\nUser: {}\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Post.tags"), "{message}");
    assert!(matches!(err, Error::Shape { .. }));
}

#[test]
fn graph_report_orders_blog_dependencies() {
    let schema = parse_schema(&load_fixture("blog.yaml")).expect("parse blog fixture");
    let report = build_relation_graph_report(&schema);

    assert_eq!(report.summary.entities, 4);
    assert_eq!(report.summary.references, 2);
    assert_eq!(report.summary.join_tables, 1);
    let order = report.topo_order.expect("acyclic");
    assert_eq!(order.last().map(String::as_str), Some("Post"));
}
