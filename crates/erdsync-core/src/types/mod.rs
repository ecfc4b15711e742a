mod cardinality;
mod entity;
mod field;
mod field_type;
mod ids;
mod names;

pub use cardinality::Cardinality;
pub use entity::Entity;
pub use field::{Field, FkReference};
pub use field_type::FieldType;
pub use ids::{EntityId, FieldId};
pub use names::{sanitize_description, EntityName, FieldName};
