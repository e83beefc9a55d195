//! Tests for loading command trees from JSON schema documents.

use argot_diagnostics::codes;
use argot_schema::{
    DeclarationKind, DefaultValue, MultiplePolicy, SCHEMA_FORMAT_VERSION, SchemaError, SchemaFile,
    UnrecognizedPolicy, Value,
};

const DOCUMENT: &str = r#"{
  "options": { "unrecognizedArgument": "skip", "environmentPrefix": "GIT" },
  "root": {
    "name": "git",
    "description": "the stupid content tracker",
    "declarations": [
      { "kind": "flag", "long": "git-dir", "description": "repository path" }
    ],
    "commands": [
      {
        "name": "remote",
        "inherit": true,
        "declarations": [
          { "kind": "flag", "long": "verbose", "aliases": [{ "kind": "short", "value": "v" }],
            "types": ["boolean"], "optional": true, "specifiedDefault": true }
        ],
        "commands": [
          { "name": "add", "inherit": true, "declarations": [
            { "kind": "positional", "key": "name" },
            { "kind": "positional", "key": "url" },
            { "kind": "flag", "long": "track", "array": true, "optional": true, "unspecifiedDefault": ["main"] }
          ] }
        ]
      }
    ]
  }
}"#;

#[test]
fn document_builds_the_described_tree() {
    let file = SchemaFile::from_json(DOCUMENT).unwrap();
    assert_eq!(file.version, SCHEMA_FORMAT_VERSION);
    let (root, options) = file.into_parts().unwrap();

    assert_eq!(options.unrecognized_argument, UnrecognizedPolicy::Skip);
    assert_eq!(options.environment_prefix.as_deref(), Some("GIT"));
    assert_eq!(options.array_multiple_definitions, MultiplePolicy::Append);

    assert_eq!(root.description(), Some("the stupid content tracker"));
    let chain = root.resolve_path(&["remote", "add"]).unwrap();
    assert_eq!(chain.len(), 3);
    let add = chain[2];
    assert!(add.inherits());

    let url = add.declaration("url").unwrap();
    assert!(matches!(url.kind, DeclarationKind::Positional { index: 1, .. }));
    let track = add.declaration("track").unwrap();
    assert_eq!(
        track.unspecified_default,
        Some(DefaultValue::Multi(vec![Value::from("main")]))
    );
}

#[test]
fn effective_declarations_list_ancestors_first() {
    let (root, _) = SchemaFile::from_json(DOCUMENT).unwrap().into_parts().unwrap();
    let keys: Vec<String> = root
        .effective_declarations(&["remote", "add"])
        .iter()
        .map(|d| d.key().to_string())
        .collect();
    assert_eq!(keys, ["git-dir", "verbose", "name", "url", "track"]);
    assert!(root.effective_declarations(&["nope"]).is_empty());
}

#[test]
fn sibling_name_clash_is_rejected() {
    let doc = r#"{ "root": { "name": "app", "commands": [
        { "name": "remove", "aliases": ["rm"] },
        { "name": "rm" }
    ] } }"#;
    let err = SchemaFile::from_json(doc).unwrap().into_parts().unwrap_err();
    assert!(matches!(
        &err,
        SchemaError::DuplicateCommand { name, parent } if name == "rm" && parent == "app"
    ));
    assert_eq!(err.to_diagnostic().id, codes::DUPLICATE_COMMAND);
}

#[test]
fn inherited_clash_is_rejected_on_load() {
    let doc = r#"{ "root": { "name": "app",
        "declarations": [{ "kind": "flag", "long": "force" }],
        "commands": [{ "name": "push", "inherit": true,
            "declarations": [{ "kind": "flag", "long": "force" }] }]
    } }"#;
    let err = SchemaFile::from_json(doc).unwrap().into_parts().unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateKey { key, .. } if key == "force"));
}

#[test]
fn declaration_without_types_is_rejected() {
    let doc = r#"{ "root": { "name": "app",
        "declarations": [{ "kind": "flag", "long": "level", "types": [] }] } }"#;
    let err = SchemaFile::from_json(doc).unwrap().into_parts().unwrap_err();
    assert!(matches!(err, SchemaError::InvalidDeclaration { .. }));
    assert_eq!(err.to_diagnostic().id, codes::INVALID_DECLARATION);
}

#[test]
fn malformed_document_is_rejected() {
    let err = SchemaFile::from_json(r#"{ "options": {} }"#).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidJson(_)));
}
