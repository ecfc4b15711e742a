//! Binding relationship lines to foreign-key fields.
//!
//! A relationship line names two entities but not the field that carries
//! the reference. A [`FkResolver`] picks that field on the owning side.

use erdsync_core::types::{Entity, Field};

/// Chooses which field of `owner` a relationship to `target` binds to.
pub trait FkResolver {
    /// Returns the index into `owner.fields`, or `None` to leave the
    /// relationship unbound.
    fn resolve(&self, owner: &Entity, target: &Entity, label: Option<&str>) -> Option<usize>;
}

/// No earlier relationship has bound this field.
fn unclaimed(field: &Field) -> bool {
    field.fk_reference.as_ref().map_or(true, |r| !r.is_resolved())
}

/// FK fields that no earlier relationship has claimed.
fn open_candidates(owner: &Entity) -> impl Iterator<Item = (usize, &Field)> {
    owner
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_fk && unclaimed(f))
}

/// An unclaimed field named exactly by the label. Key fields qualify as
/// well: a composite key column that also references another entity is
/// written with `PK` only.
fn label_match(owner: &Entity, label: Option<&str>) -> Option<usize> {
    let label = label?;
    owner
        .fields
        .iter()
        .position(|f| (f.is_fk || f.is_pk) && unclaimed(f) && f.name.matches(label))
}

/// The default strategy.
///
/// An unbound FK field whose name equals the label wins. Otherwise the first
/// unbound FK field whose lowercased name contains the target's lowercased
/// name, or ends in `id`, is taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicResolver;

impl FkResolver for HeuristicResolver {
    fn resolve(&self, owner: &Entity, target: &Entity, label: Option<&str>) -> Option<usize> {
        if let Some(index) = label_match(owner, label) {
            return Some(index);
        }
        let target_name = target.name.as_str().to_lowercase();
        open_candidates(owner)
            .find(|(_, f)| {
                let name = f.name.as_str().to_lowercase();
                name.contains(&target_name) || name.ends_with("id")
            })
            .map(|(i, _)| i)
    }
}

/// Binds only when the relationship label names an FK field exactly
/// (case-insensitively). Useful when naming heuristics guess wrong.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelResolver;

impl FkResolver for LabelResolver {
    fn resolve(&self, owner: &Entity, _target: &Entity, label: Option<&str>) -> Option<usize> {
        label_match(owner, label)
    }
}
