use std::collections::HashMap;

use crate::types::{Entity, EntityId, FieldId};

/// Carries ids from a live model over to a freshly parsed one.
///
/// Parsing always mints new ids. Entities are matched to live ones by
/// case-insensitive name, and fields by case-insensitive name within a
/// matched entity; matches take the live id. FK targets are rewritten
/// through the same mapping so references stay consistent. Anything
/// without a live counterpart keeps its fresh id, and a live id is handed
/// out at most once.
pub fn reconcile(live: &[Entity], parsed: Vec<Entity>) -> Vec<Entity> {
    let mut entity_ids: HashMap<EntityId, EntityId> = HashMap::new();
    let mut field_ids: HashMap<FieldId, FieldId> = HashMap::new();

    let mut out = parsed;
    for entity in &mut out {
        let previous = live.iter().find(|e| {
            e.name.matches(entity.name.as_str()) && !entity_ids.values().any(|id| *id == e.id)
        });
        let Some(previous) = previous else {
            continue;
        };
        entity_ids.insert(entity.id.clone(), previous.id.clone());
        entity.id = previous.id.clone();

        for field in &mut entity.fields {
            if let Some(old) = previous.field(field.name.as_str()) {
                field_ids.insert(field.id.clone(), old.id.clone());
                field.id = old.id.clone();
            }
        }
    }

    for reference in out
        .iter_mut()
        .flat_map(|e| e.fields.iter_mut())
        .filter_map(|f| f.fk_reference.as_mut())
    {
        if let Some(target) = reference.target_entity_id.as_mut() {
            if let Some(mapped) = entity_ids.get(target) {
                *target = mapped.clone();
            }
        }
        if let Some(target) = reference.target_field_id.as_mut() {
            if let Some(mapped) = field_ids.get(target) {
                *target = mapped.clone();
            }
        }
    }

    tracing::trace!(
        entities = entity_ids.len(),
        fields = field_ids.len(),
        "reconciled ids with live model"
    );
    out
}
