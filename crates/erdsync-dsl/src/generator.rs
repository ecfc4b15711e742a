//! Entities to diagram text.

use std::collections::{HashMap, HashSet};

use erdsync_core::types::{Entity, EntityId};

use crate::parser::HEADER;

/// Renders entities as `erDiagram` text.
///
/// Entities and fields keep their order. Relationship lines follow the
/// blocks, one per FK field whose target entity still exists; a mirrored
/// pair between two entities with the same symbol is emitted once.
pub fn generate(entities: &[Entity]) -> String {
    if entities.is_empty() {
        return HEADER.to_string();
    }

    let mut lines = vec![HEADER.to_string()];
    for (i, entity) in entities.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        push_entity(entity, &mut lines);
    }

    let relationships = relationship_lines(entities);
    if !relationships.is_empty() {
        lines.push(String::new());
        lines.extend(relationships);
    }
    lines.join("\n")
}

fn push_entity(entity: &Entity, lines: &mut Vec<String>) {
    lines.push(format!("  {} {{", quote(entity.name.as_str())));
    for field in &entity.fields {
        let mut line = format!("    {} {}", field.field_type, field.name);
        if field.is_pk {
            line.push_str(" PK");
        } else if field.is_fk {
            line.push_str(" FK");
        }
        if let Some(description) = field.description.as_deref().filter(|d| !d.is_empty()) {
            line.push(' ');
            line.push_str(&quote(description));
        }
        lines.push(line);
    }
    lines.push("  }".to_string());
}

fn relationship_lines(entities: &[Entity]) -> Vec<String> {
    let by_id: HashMap<&EntityId, &Entity> = entities.iter().map(|e| (&e.id, e)).collect();
    let mut emitted: HashSet<(&EntityId, &EntityId, &'static str)> = HashSet::new();
    let mut lines = Vec::new();

    for owner in entities {
        for field in owner.foreign_keys() {
            let Some(reference) = field.fk_reference.as_ref() else {
                continue;
            };
            let Some(target) = reference
                .target_entity_id
                .as_ref()
                .and_then(|id| by_id.get(id).copied())
            else {
                continue;
            };

            let symbol = reference.cardinality.symbol();
            if owner.id != target.id && emitted.contains(&(&target.id, &owner.id, symbol)) {
                tracing::trace!(
                    from = %owner.name,
                    to = %target.name,
                    "skipping mirrored relationship"
                );
                continue;
            }
            emitted.insert((&owner.id, &target.id, symbol));

            let label = reference
                .relationship_label
                .as_deref()
                .unwrap_or(field.name.as_str());
            lines.push(format!(
                "  {} {} {} : {}",
                quote(owner.name.as_str()),
                symbol,
                quote(target.name.as_str()),
                quote(label)
            ));
        }
    }
    lines
}

/// Wraps text in double quotes, replacing characters that would end the
/// quoted segment or the line.
fn quote(text: &str) -> String {
    let inner: String = text
        .chars()
        .map(|c| match c {
            '"' => '\'',
            '\r' | '\n' => ' ',
            c => c,
        })
        .collect();
    format!("\"{inner}\"")
}

#[cfg(test)]
mod tests {
    use erdsync_core::types::{Cardinality, EntityName, Field, FieldName, FieldType, FkReference};

    use super::*;

    fn field(name: &str, ty: FieldType) -> Field {
        Field::new(FieldName::new(name).unwrap(), ty)
    }

    fn entity(name: &str, fields: Vec<Field>) -> Entity {
        Entity::with_fields(EntityName::new(name).unwrap(), fields)
    }

    #[test]
    fn empty_model_is_header_only() {
        assert_eq!(generate(&[]), "erDiagram");
    }

    #[test]
    fn block_layout() {
        let users = entity(
            "Users",
            vec![
                field("id", FieldType::Int).primary_key(),
                field("email", FieldType::String).with_description("login \"name\""),
            ],
        );
        assert_eq!(
            generate(&[users]),
            "erDiagram\n  \"Users\" {\n    int id PK\n    string email \"login 'name'\"\n  }"
        );
    }

    #[test]
    fn pk_takes_precedence_over_fk() {
        let mut id = field("id", FieldType::Int).primary_key();
        id.mark_foreign_key();
        let text = generate(&[entity("A", vec![id])]);
        assert!(text.contains("    int id PK\n"));
        assert!(!text.contains("FK"));
    }

    #[test]
    fn relationship_defaults_label_to_field_name() {
        let users = entity("Users", vec![field("id", FieldType::Int).primary_key()]);
        let posts = entity(
            "Posts",
            vec![field("user_id", FieldType::Int).references(FkReference::to(
                users.id.clone(),
                None,
                Cardinality::ManyToOne,
            ))],
        );
        let text = generate(&[users, posts]);
        assert!(text.ends_with("\n\n  \"Posts\" }o--|| \"Users\" : \"user_id\""));
    }

    #[test]
    fn explicit_label_is_used() {
        let users = entity("Users", vec![]);
        let posts = entity(
            "Posts",
            vec![field("author", FieldType::Int).references(
                FkReference::to(users.id.clone(), None, Cardinality::OneToOne)
                    .with_label("written by"),
            )],
        );
        assert!(generate(&[users, posts]).contains("\"Posts\" ||--|| \"Users\" : \"written by\""));
    }

    #[test]
    fn unresolved_and_dangling_references_are_skipped() {
        let mut pending = field("a_id", FieldType::Int);
        pending.mark_foreign_key();
        let dangling = field("b_id", FieldType::Int).references(FkReference::to(
            EntityId::new(),
            None,
            Cardinality::ManyToOne,
        ));
        let text = generate(&[entity("C", vec![pending, dangling])]);
        assert!(!text.contains("--"));
    }

    #[test]
    fn mirrored_pair_is_emitted_once() {
        let mut a = entity("A", vec![]);
        let mut b = entity("B", vec![]);
        a.fields.push(field("b_id", FieldType::Int).references(FkReference::to(
            b.id.clone(),
            None,
            Cardinality::OneToOne,
        )));
        b.fields.push(field("a_id", FieldType::Int).references(FkReference::to(
            a.id.clone(),
            None,
            Cardinality::OneToOne,
        )));
        let text = generate(&[a, b]);
        assert_eq!(text.matches("||--||").count(), 1);
        assert!(text.contains("\"A\" ||--|| \"B\""));
    }

    #[test]
    fn self_references_are_never_merged() {
        let mut node = entity("Node", vec![field("id", FieldType::Int).primary_key()]);
        let node_id = node.id.clone();
        for name in ["parent_id", "next_id"] {
            node.fields.push(field(name, FieldType::Int).references(FkReference::to(
                node_id.clone(),
                None,
                Cardinality::ManyToOne,
            )));
        }
        assert_eq!(generate(&[node]).matches("}o--||").count(), 2);
    }

    #[test]
    fn quoted_segments_are_resanitized() {
        let mut users = entity("Users", vec![field("id", FieldType::Int)]);
        users.fields[0].description = Some("a \"raw\"\nnote".to_string());
        assert!(generate(&[users]).contains("\"a 'raw' note\""));
    }
}
