use std::fmt;

use crate::types::{EntityId, FieldId};

/// Errors raised when constructing model values or mutating a [`Project`].
///
/// [`Project`]: crate::project::Project
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// Entity name was empty after normalization.
    EmptyEntityName,
    /// Field name was empty after normalization.
    EmptyFieldName,
    /// Another entity already uses this name (case-insensitive).
    DuplicateEntityName(String),
    /// The entity already has a field with this name (case-insensitive).
    DuplicateFieldName { entity: String, field: String },
    /// No entity with this id exists in the project.
    EntityNotFound(EntityId),
    /// No field with this id exists on the entity.
    FieldNotFound(FieldId),
    /// An FK reference points at an entity that is not in the project.
    UnknownTargetEntity(EntityId),
    /// An FK reference points at a field that is not on its target entity.
    UnknownTargetField(FieldId),
    /// The entity has no primary-key field.
    MissingPrimaryKey(String),
    /// An id string could not be parsed.
    InvalidId(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEntityName => write!(f, "entity name must not be empty"),
            Self::EmptyFieldName => write!(f, "field name must not be empty"),
            Self::DuplicateEntityName(name) => {
                write!(f, "an entity named '{name}' already exists")
            }
            Self::DuplicateFieldName { entity, field } => {
                write!(f, "entity '{entity}' already has a field named '{field}'")
            }
            Self::EntityNotFound(id) => write!(f, "entity '{id}' not found"),
            Self::FieldNotFound(id) => write!(f, "field '{id}' not found"),
            Self::UnknownTargetEntity(id) => {
                write!(f, "foreign key targets unknown entity '{id}'")
            }
            Self::UnknownTargetField(id) => {
                write!(f, "foreign key targets unknown field '{id}'")
            }
            Self::MissingPrimaryKey(entity) => {
                write!(f, "entity '{entity}' has no primary key field")
            }
            Self::InvalidId(msg) => write!(f, "invalid id: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let cases = vec![
            (ModelError::EmptyEntityName, "entity name must not be empty"),
            (ModelError::EmptyFieldName, "field name must not be empty"),
            (
                ModelError::DuplicateEntityName("Users".into()),
                "an entity named 'Users' already exists",
            ),
            (
                ModelError::DuplicateFieldName {
                    entity: "Users".into(),
                    field: "email".into(),
                },
                "entity 'Users' already has a field named 'email'",
            ),
            (
                ModelError::MissingPrimaryKey("Tags".into()),
                "entity 'Tags' has no primary key field",
            ),
            (ModelError::InvalidId("bad".into()), "invalid id: bad"),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected, "display for {error:?}");
        }
    }

    #[test]
    fn not_found_mentions_id() {
        let id = EntityId::new();
        let msg = ModelError::EntityNotFound(id.clone()).to_string();
        assert!(msg.contains(id.as_str()));
    }

    #[test]
    fn error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ModelError::EmptyEntityName);
        assert!(err.to_string().contains("entity name"));
    }
}
