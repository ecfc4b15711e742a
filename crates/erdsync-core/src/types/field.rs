use serde::{Deserialize, Serialize};

use super::cardinality::Cardinality;
use super::field_type::FieldType;
use super::ids::{EntityId, FieldId};
use super::names::{sanitize_description, FieldName};

/// Link from a foreign-key field to the entity (and key field) it refers to.
///
/// A `None` target is the unresolved sentinel: the field is declared as a
/// foreign key but not yet bound to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FkReference {
    #[serde(default)]
    pub target_entity_id: Option<EntityId>,
    #[serde(default)]
    pub target_field_id: Option<FieldId>,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_label: Option<String>,
}

impl FkReference {
    /// A reference with no target yet.
    pub fn unresolved(cardinality: Cardinality) -> Self {
        Self {
            cardinality,
            ..Self::default()
        }
    }

    /// A reference to `entity`, optionally pinned to one of its fields.
    pub fn to(entity: EntityId, field: Option<FieldId>, cardinality: Cardinality) -> Self {
        Self {
            target_entity_id: Some(entity),
            target_field_id: field,
            cardinality,
            relationship_label: None,
        }
    }

    /// Attaches a relationship label; blank labels are dropped.
    pub fn with_label(mut self, label: impl AsRef<str>) -> Self {
        self.relationship_label = sanitize_description(label.as_ref());
        self
    }

    /// Whether the target entity is known.
    pub fn is_resolved(&self) -> bool {
        self.target_entity_id.is_some()
    }

    /// Resets the target to the unresolved sentinel, keeping cardinality and label.
    pub fn unlink(&mut self) {
        self.target_entity_id = None;
        self.target_field_id = None;
    }
}

/// A column of an entity.
///
/// `fk_reference` is present exactly when `is_fk` is set; use
/// [`Field::mark_foreign_key`], [`Field::references`] and
/// [`Field::clear_foreign_key`] to change either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    pub name: FieldName,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(rename = "isPK", default)]
    pub is_pk: bool,
    #[serde(rename = "isFK", default)]
    pub is_fk: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk_reference: Option<FkReference>,
}

impl Field {
    /// Creates a plain field with a fresh id.
    pub fn new(name: FieldName, field_type: FieldType) -> Self {
        Self {
            id: FieldId::new(),
            name,
            field_type,
            is_pk: false,
            is_fk: false,
            description: None,
            fk_reference: None,
        }
    }

    /// Marks the field as (part of) the primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_pk = true;
        self
    }

    /// Sets the description, sanitized for emission.
    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        self.set_description(Some(description.as_ref()));
        self
    }

    /// Makes the field a foreign key with the given reference.
    pub fn references(mut self, reference: FkReference) -> Self {
        self.is_fk = true;
        self.fk_reference = Some(reference);
        self
    }

    pub fn set_description(&mut self, description: Option<&str>) {
        self.description = description.and_then(sanitize_description);
    }

    /// Flags the field as a foreign key, creating an unresolved reference if needed.
    pub fn mark_foreign_key(&mut self) {
        self.is_fk = true;
        if self.fk_reference.is_none() {
            self.fk_reference = Some(FkReference::unresolved(Cardinality::default()));
        }
    }

    pub fn clear_foreign_key(&mut self) {
        self.is_fk = false;
        self.fk_reference = None;
    }

    /// Restores the `is_fk` / `fk_reference` pairing after deserialization.
    pub fn normalize(&mut self) {
        if self.fk_reference.is_some() {
            self.is_fk = true;
        } else if self.is_fk {
            self.mark_foreign_key();
        }
        if let Some(desc) = self.description.take() {
            self.set_description(Some(&desc));
        }
    }

    /// The resolved target entity, if any.
    pub fn target_entity(&self) -> Option<&EntityId> {
        self.fk_reference
            .as_ref()
            .and_then(|r| r.target_entity_id.as_ref())
    }
}
