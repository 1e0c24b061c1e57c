use entigen_core::{Schema, parse_schema};
use schemars::schema_for;

#[test]
fn serializes_schema_deterministically() {
    let schema = parse_schema("Tag:\n").expect("parse schema");

    let json = serde_json::to_string_pretty(&schema).expect("serialize schema");
    let expected = r#"{
  "entities": {
    "Tag": {
      "name": "Tag",
      "fields": {
        "id": {
          "kind": "uuid",
          "default_value": "crypto.randomUUID()",
          "primary_key": true,
          "foreign_key": false
        }
      },
      "relations": {}
    }
  },
  "join_tables": {}
}"#;
    assert_eq!(json, expected);
}

#[test]
fn relation_kinds_serialize_in_camel_case() {
    let schema = parse_schema("Tag: {}\nUser: {}\nPost:\n  author: User\n  tags: [Tag]\n")
        .expect("parse schema");
    let value = serde_json::to_value(&schema).expect("serialize schema");

    let relations = &value["entities"]["Post"]["relations"];
    assert_eq!(relations["author"]["kind"], "belongsTo");
    assert_eq!(relations["author"]["foreign_key"], "userId");
    assert_eq!(relations["tags"]["kind"], "manyToMany");
    assert_eq!(relations["tags"]["join_table"], "post_tag");
}

#[test]
fn json_schema_describes_the_schema_graph() {
    let generated = serde_json::to_value(schema_for!(Schema)).expect("serialize json schema");

    assert!(generated["properties"]["entities"].is_object());
    assert!(generated["properties"]["join_tables"].is_object());
    let definitions = generated["definitions"]
        .as_object()
        .expect("definitions object");
    for name in ["EntityConfig", "FieldConfig", "RelationConfig", "JoinTableConfig"] {
        assert!(definitions.contains_key(name), "missing definition {name}");
    }
}
