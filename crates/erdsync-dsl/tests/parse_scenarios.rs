use erdsync_core::types::{Cardinality, FieldType};
use erdsync_dsl::{generate, parse, Diagram, ParseError, ParseErrorKind, WarningKind};

fn entity<'a>(diagram: &'a Diagram, name: &str) -> &'a erdsync_core::types::Entity {
    diagram
        .entities
        .iter()
        .find(|e| e.name.as_str() == name)
        .unwrap_or_else(|| panic!("entity {name} missing"))
}

#[test]
fn users_and_posts_scenario() {
    let source = "erDiagram\n  \"Users\" {\n    int id PK\n    string email\n  }\n  \"Posts\" {\n    int id PK\n    int user_id FK\n  }\n  \"Posts\" }o--|| \"Users\" : \"by user_id\"";
    let diagram = parse(source).unwrap();

    assert_eq!(diagram.entities.len(), 2);
    let users = entity(&diagram, "Users");
    let posts = entity(&diagram, "Posts");
    assert_eq!(users.fields.len(), 2);
    assert_eq!(posts.fields.len(), 2);

    let user_id = &posts.fields[1];
    assert_eq!(user_id.name.as_str(), "user_id");
    assert!(user_id.is_fk);
    let reference = user_id.fk_reference.as_ref().unwrap();
    assert_eq!(reference.target_entity_id.as_ref(), Some(&users.id));
    assert_eq!(reference.target_field_id.as_ref(), Some(&users.fields[0].id));
    assert_eq!(reference.cardinality, Cardinality::ManyToOne);
    assert_eq!(reference.relationship_label.as_deref(), Some("by user_id"));
}

#[test]
fn header_is_required() {
    for source in [
        "",
        "   \n\n",
        "graph TD\n  A --> B",
        "Users {\n int id\n}",
        "%% notes\nerDiagram\n  A\n",
    ] {
        let err = parse(source).unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::MissingHeader, "{source:?}");
    }
}

#[test]
fn header_without_entities_is_rejected() {
    assert_eq!(
        parse("erDiagram\n\n%% only a comment\n"),
        Err(ParseError::NoEntitiesFound)
    );
}

#[test]
fn unknown_type_falls_back_to_string() {
    let diagram = parse("erDiagram\n  Things {\n    weirdtype name\n  }").unwrap();
    assert_eq!(diagram.entities[0].fields[0].field_type, FieldType::String);
}

#[test]
fn type_synonyms() {
    let source = "erDiagram\nT {\n varchar(80) a\n integer b\n bool c\n double d\n time e\n BIGINT f\n}";
    let diagram = parse(source).unwrap();
    let types: Vec<_> = diagram.entities[0].fields.iter().map(|f| f.field_type).collect();
    assert_eq!(
        types,
        [
            FieldType::String,
            FieldType::Int,
            FieldType::Boolean,
            FieldType::Float,
            FieldType::Timestamp,
            FieldType::Int,
        ]
    );
}

#[test]
fn cardinality_symbols_follow_the_table() {
    let cases = [
        ("||--||", Cardinality::OneToOne),
        ("||--o{", Cardinality::OneToMany),
        ("}o--||", Cardinality::ManyToOne),
        ("}o--o{", Cardinality::ManyToMany),
        ("|o..|{", Cardinality::OneToMany),
        ("}|..o|", Cardinality::ManyToOne),
    ];
    for (symbol, expected) in cases {
        let source = format!("erDiagram\nA {{\n int b_id FK\n}}\nB {{\n int id PK\n}}\nA {symbol} B : b_id\n");
        let diagram = parse(&source).unwrap();
        let reference = diagram.entities[0].fields[0].fk_reference.as_ref().unwrap();
        assert_eq!(reference.cardinality, expected, "{symbol}");
        assert!(reference.is_resolved());
    }
}

#[test]
fn mirrored_relationships_are_emitted_once() {
    let source = "erDiagram\nA {\n int id PK\n int b_id FK\n}\nB {\n int id PK\n int a_id FK\n}\nA ||--|| B : b_id\nB ||--|| A : a_id\n";
    let diagram = parse(source).unwrap();
    assert!(diagram.entities.iter().all(|e| e.fields[1]
        .fk_reference
        .as_ref()
        .is_some_and(|r| r.is_resolved())));

    let text = generate(&diagram.entities);
    assert_eq!(text.matches("||--||").count(), 1);
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let source = "erDiagram\n%% leading comment\n\n  // users table\n  Users {\n    %% key\n    int id PK\n\n  }\n";
    let diagram = parse(source).unwrap();
    assert!(diagram.warnings.is_empty());
    assert_eq!(diagram.entities[0].fields.len(), 1);
}

#[test]
fn broken_lines_do_not_stop_the_parse() {
    let source = "erDiagram\n  Users {\n    int id PK\n    ???\n    string \"unterminated\n    string email\n  }\n  Users ||--o{ Ghost : x\n  Posts\n";
    let diagram = parse(source).unwrap();
    assert_eq!(diagram.entities.len(), 2);
    assert_eq!(entity(&diagram, "Users").fields.len(), 2);

    let kinds: Vec<_> = diagram.warnings.iter().map(|w| &w.kind).collect();
    assert!(kinds.contains(&&WarningKind::InvalidFieldLine));
    assert!(kinds.contains(&&WarningKind::MalformedLine));
    assert!(kinds.contains(&&WarningKind::UnknownEntity {
        name: "Ghost".into()
    }));
}

#[test]
fn first_matching_fk_field_is_bound() {
    // Both FK fields end in "id"; without a matching label the first wins.
    let source = "erDiagram\nU {\n int id PK\n}\nP {\n int author_id FK\n int editor_id FK\n}\nP }o--|| U : writes\nP }o--|| U : edits\n";
    let diagram = parse(source).unwrap();
    let posts = entity(&diagram, "P");
    let labels: Vec<_> = posts
        .fields
        .iter()
        .map(|f| f.fk_reference.as_ref().and_then(|r| r.relationship_label.as_deref()))
        .collect();
    assert_eq!(labels, [Some("writes"), Some("edits")]);
}
