use erdsync_core::types::{sanitize_description, Cardinality, EntityName, FieldName, FieldType};
use proptest::prelude::*;

proptest! {
    /// A sanitized entity name never contains characters that break quoting.
    #[test]
    fn entity_name_is_quote_safe(input in "\\PC{1,40}") {
        if let Ok(name) = EntityName::new(&input) {
            let s = name.as_str();
            prop_assert!(!s.is_empty());
            prop_assert!(!s.contains(['"', '{', '}', '|', '\n', '\r']), "entity name contains a quote-breaking character: {:?}", s);
            prop_assert_eq!(s, s.trim());
        }
    }

    /// A sanitized field name is a single whitespace-free token.
    #[test]
    fn field_name_is_single_token(input in "\\PC{1,40}") {
        if let Ok(name) = FieldName::new(&input) {
            let s = name.as_str();
            prop_assert!(!s.is_empty());
            prop_assert!(!s.chars().any(char::is_whitespace));
            prop_assert!(!s.contains(['"', '{', '}', '|', ':', ',', '%', '/']), "field name contains a reserved character: {:?}", s);
        }
    }

    /// Sanitizing twice changes nothing.
    #[test]
    fn sanitizing_is_idempotent(input in "\\PC{1,40}") {
        if let Ok(name) = EntityName::new(&input) {
            prop_assert_eq!(EntityName::new(name.as_str()).unwrap(), name);
        }
        if let Ok(name) = FieldName::new(&input) {
            prop_assert_eq!(FieldName::new(name.as_str()).unwrap(), name);
        }
        if let Some(desc) = sanitize_description(&input) {
            prop_assert_eq!(sanitize_description(&desc), Some(desc.clone()));
        }
    }

    /// Type classification never panics and is total.
    #[test]
    fn field_type_classification_is_total(token in "\\PC{0,20}") {
        let ft = FieldType::from_dsl(&token);
        prop_assert!(FieldType::ALL.contains(&ft));
    }

    /// Arbitrary six-character strings either classify or are rejected, never panic.
    #[test]
    fn symbol_parsing_never_panics(symbol in "[|}o{.\\-]{6}") {
        if let Some(c) = Cardinality::from_symbol(&symbol) {
            prop_assert!(Cardinality::ALL.contains(&c));
        }
    }
}
