use serde::{Deserialize, Serialize};

use super::field::Field;
use super::ids::{EntityId, FieldId};
use super::names::EntityName;

/// A table of the model: a name and its ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: EntityName,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Entity {
    /// Creates an entity with a fresh id and no fields.
    pub fn new(name: EntityName) -> Self {
        Self {
            id: EntityId::new(),
            name,
            fields: Vec::new(),
        }
    }

    /// Creates an entity with a fresh id and the given fields.
    pub fn with_fields(name: EntityName, fields: Vec<Field>) -> Self {
        Self {
            id: EntityId::new(),
            name,
            fields,
        }
    }

    /// Looks up a field by name, case-insensitively.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.matches(name))
    }

    pub fn field_by_id(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub(crate) fn field_by_id_mut(&mut self, id: &FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| &f.id == id)
    }

    /// The first field marked as primary key.
    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_pk)
    }

    /// Fields flagged as foreign keys, in order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_fk)
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} fields)", self.name, self.fields.len())
    }
}
