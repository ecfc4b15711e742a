//! The single source of truth for one entity graph.
//!
//! A [`Project`] owns its entities and can only be changed through the
//! operations declared here. Each successful operation bumps a revision
//! counter, which lets a sync loop tell its own writes apart from edits
//! that came from elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::types::{
    Cardinality, Entity, EntityId, EntityName, Field, FieldId, FieldName, FieldType, FkReference,
};

/// Everything needed to add a field, minus its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDraft {
    pub name: String,
    pub field_type: FieldType,
    pub is_pk: bool,
    pub description: Option<String>,
    pub fk_reference: Option<FkReference>,
}

impl FieldDraft {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            is_pk: false,
            description: None,
            fk_reference: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_pk = true;
        self
    }

    pub fn foreign_key(mut self, reference: FkReference) -> Self {
        self.fk_reference = Some(reference);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A partial change to an existing field; `None` members are left alone.
///
/// `fk_reference: Some(None)` turns the field back into a plain column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    pub name: Option<String>,
    pub field_type: Option<FieldType>,
    pub is_pk: Option<bool>,
    pub description: Option<Option<String>>,
    pub fk_reference: Option<Option<FkReference>>,
}

/// A named entity graph plus its change bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    name: String,
    #[serde(default)]
    entities: Vec<Entity>,
    #[serde(default)]
    revision: u64,
    last_modified: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            entities: Vec::new(),
            revision: 0,
            last_modified: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Monotonic counter bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    /// Looks up an entity by name, case-insensitively.
    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name.matches(name))
    }

    // -- Entity operations --

    pub fn add_entity(&mut self, name: &str) -> Result<EntityId, ModelError> {
        let name = EntityName::new(name)?;
        self.ensure_entity_name_free(&name, None)?;

        let entity = Entity::new(name);
        let id = entity.id.clone();
        tracing::debug!(entity = %entity.name, id = %id, "adding entity");
        self.entities.push(entity);
        self.touch();
        Ok(id)
    }

    pub fn rename_entity(&mut self, id: &EntityId, name: &str) -> Result<(), ModelError> {
        let name = EntityName::new(name)?;
        self.ensure_entity_name_free(&name, Some(id))?;
        let entity = self.entity_mut(id)?;
        tracing::debug!(from = %entity.name, to = %name, "renaming entity");
        entity.name = name;
        self.touch();
        Ok(())
    }

    /// Removes the entity with all its fields and unlinks references to it.
    pub fn delete_entity(&mut self, id: &EntityId) -> Result<(), ModelError> {
        let index = self
            .entities
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| ModelError::EntityNotFound(id.clone()))?;
        let removed = self.entities.remove(index);
        tracing::debug!(entity = %removed.name, "deleting entity");

        for field in self.entities.iter_mut().flat_map(|e| e.fields.iter_mut()) {
            if let Some(reference) = field.fk_reference.as_mut() {
                if reference.target_entity_id.as_ref() == Some(id) {
                    reference.unlink();
                }
            }
        }
        self.touch();
        Ok(())
    }

    // -- Field operations --

    pub fn add_field(
        &mut self,
        entity_id: &EntityId,
        draft: FieldDraft,
    ) -> Result<FieldId, ModelError> {
        let name = FieldName::new(&draft.name)?;
        if let Some(reference) = &draft.fk_reference {
            self.validate_reference(reference)?;
        }

        let entity = self.entity_mut(entity_id)?;
        if entity.field(name.as_str()).is_some() {
            return Err(ModelError::DuplicateFieldName {
                entity: entity.name.to_string(),
                field: name.to_string(),
            });
        }

        let mut field = Field::new(name, draft.field_type);
        field.is_pk = draft.is_pk;
        field.set_description(draft.description.as_deref());
        if let Some(reference) = draft.fk_reference {
            field = field.references(reference);
        }

        let id = field.id.clone();
        tracing::debug!(entity = %entity.name, field = %field.name, "adding field");
        entity.fields.push(field);
        self.touch();
        Ok(id)
    }

    pub fn update_field(
        &mut self,
        entity_id: &EntityId,
        field_id: &FieldId,
        update: FieldUpdate,
    ) -> Result<(), ModelError> {
        let new_name = update.name.as_deref().map(FieldName::new).transpose()?;
        if let Some(Some(reference)) = &update.fk_reference {
            self.validate_reference(reference)?;
        }

        let entity = self.entity_mut(entity_id)?;
        if let Some(name) = &new_name {
            let clash = entity
                .fields
                .iter()
                .any(|f| &f.id != field_id && f.name.matches(name.as_str()));
            if clash {
                return Err(ModelError::DuplicateFieldName {
                    entity: entity.name.to_string(),
                    field: name.to_string(),
                });
            }
        }

        let entity_name = entity.name.clone();
        let field = entity
            .field_by_id_mut(field_id)
            .ok_or_else(|| ModelError::FieldNotFound(field_id.clone()))?;

        if let Some(name) = new_name {
            field.name = name;
        }
        if let Some(field_type) = update.field_type {
            field.field_type = field_type;
        }
        if let Some(is_pk) = update.is_pk {
            field.is_pk = is_pk;
        }
        if let Some(description) = update.description {
            field.set_description(description.as_deref());
        }
        match update.fk_reference {
            Some(Some(reference)) => {
                field.is_fk = true;
                field.fk_reference = Some(reference);
            }
            Some(None) => field.clear_foreign_key(),
            None => {}
        }
        tracing::debug!(entity = %entity_name, field = %field.name, "updated field");
        self.touch();
        Ok(())
    }

    /// Removes a field; references pinned to it keep their entity but lose the field.
    pub fn delete_field(
        &mut self,
        entity_id: &EntityId,
        field_id: &FieldId,
    ) -> Result<(), ModelError> {
        let entity = self.entity_mut(entity_id)?;
        let index = entity
            .fields
            .iter()
            .position(|f| &f.id == field_id)
            .ok_or_else(|| ModelError::FieldNotFound(field_id.clone()))?;
        let removed = entity.fields.remove(index);
        tracing::debug!(entity = %entity.name, field = %removed.name, "deleting field");

        for field in self.entities.iter_mut().flat_map(|e| e.fields.iter_mut()) {
            if let Some(reference) = field.fk_reference.as_mut() {
                if reference.target_field_id.as_ref() == Some(field_id) {
                    reference.target_field_id = None;
                }
            }
        }
        self.touch();
        Ok(())
    }

    /// Creates a join entity linking `source` and `target` many-to-many.
    ///
    /// The join entity gets one composite-key column per side, named
    /// `<entity>_id`, typed like that side's primary key.
    pub fn add_many_to_many(
        &mut self,
        source: &EntityId,
        target: &EntityId,
        join_name: &str,
    ) -> Result<EntityId, ModelError> {
        let join_name = EntityName::new(join_name)?;
        self.ensure_entity_name_free(&join_name, None)?;

        let source = self
            .entity(source)
            .ok_or_else(|| ModelError::EntityNotFound(source.clone()))?;
        let target = self
            .entity(target)
            .ok_or_else(|| ModelError::EntityNotFound(target.clone()))?;

        let mut fields: Vec<Field> = Vec::with_capacity(2);
        for side in [source, target] {
            let pk = side
                .primary_key()
                .ok_or_else(|| ModelError::MissingPrimaryKey(side.name.to_string()))?;
            let name = FieldName::new(format!("{}_id", side.name.as_str().to_lowercase()))?;
            if fields.iter().any(|f| f.name.matches(name.as_str())) {
                return Err(ModelError::DuplicateFieldName {
                    entity: join_name.to_string(),
                    field: name.to_string(),
                });
            }
            let field = Field::new(name, pk.field_type)
                .primary_key()
                .with_description(format!("References {}.{}", side.name, pk.name))
                .references(FkReference::to(
                    side.id.clone(),
                    Some(pk.id.clone()),
                    Cardinality::OneToMany,
                ));
            fields.push(field);
        }

        let join = Entity::with_fields(join_name, fields);
        let id = join.id.clone();
        tracing::debug!(entity = %join.name, "adding many-to-many join entity");
        self.entities.push(join);
        self.touch();
        Ok(id)
    }

    /// Replaces the whole entity list.
    ///
    /// Fields are normalized and FK targets that do not exist in the new
    /// list are reset to unresolved.
    ///
    /// # Errors
    ///
    /// Entity names must be unique case-insensitively, and so must field
    /// names within an entity. On error the project is left untouched.
    pub fn set_entities(&mut self, mut entities: Vec<Entity>) -> Result<(), ModelError> {
        for (i, entity) in entities.iter().enumerate() {
            if entities[..i].iter().any(|e| e.name.matches(entity.name.as_str())) {
                return Err(ModelError::DuplicateEntityName(entity.name.to_string()));
            }
            for (j, field) in entity.fields.iter().enumerate() {
                if entity.fields[..j].iter().any(|f| f.name.matches(field.name.as_str())) {
                    return Err(ModelError::DuplicateFieldName {
                        entity: entity.name.to_string(),
                        field: field.name.to_string(),
                    });
                }
            }
        }

        let targets: Vec<(EntityId, Vec<FieldId>)> = entities
            .iter()
            .map(|e| (e.id.clone(), e.fields.iter().map(|f| f.id.clone()).collect()))
            .collect();

        for field in entities.iter_mut().flat_map(|e| e.fields.iter_mut()) {
            field.normalize();
            let Some(reference) = field.fk_reference.as_mut() else {
                continue;
            };
            let Some(target_id) = reference.target_entity_id.clone() else {
                continue;
            };
            match targets.iter().find(|(id, _)| *id == target_id) {
                None => {
                    tracing::debug!(field = %field.name, "dropping dangling FK target");
                    reference.unlink();
                }
                Some((_, field_ids)) => {
                    if let Some(target_field) = &reference.target_field_id {
                        if !field_ids.contains(target_field) {
                            reference.target_field_id = None;
                        }
                    }
                }
            }
        }

        tracing::debug!(count = entities.len(), "replacing entities");
        self.entities = entities;
        self.touch();
        Ok(())
    }

    // -- Helpers --

    fn touch(&mut self) {
        self.revision += 1;
        self.last_modified = Utc::now();
    }

    fn entity_mut(&mut self, id: &EntityId) -> Result<&mut Entity, ModelError> {
        self.entities
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| ModelError::EntityNotFound(id.clone()))
    }

    fn ensure_entity_name_free(
        &self,
        name: &EntityName,
        except: Option<&EntityId>,
    ) -> Result<(), ModelError> {
        let taken = self
            .entities
            .iter()
            .any(|e| Some(&e.id) != except && e.name.matches(name.as_str()));
        if taken {
            Err(ModelError::DuplicateEntityName(name.to_string()))
        } else {
            Ok(())
        }
    }

    fn validate_reference(&self, reference: &FkReference) -> Result<(), ModelError> {
        let Some(target_id) = &reference.target_entity_id else {
            return Ok(());
        };
        let target = self
            .entity(target_id)
            .ok_or_else(|| ModelError::UnknownTargetEntity(target_id.clone()))?;
        if let Some(field_id) = &reference.target_field_id {
            if target.field_by_id(field_id).is_none() {
                return Err(ModelError::UnknownTargetField(field_id.clone()));
            }
        }
        Ok(())
    }
}
