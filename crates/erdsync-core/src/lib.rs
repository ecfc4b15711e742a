//! # erdsync-core
//!
//! The entity/field graph behind an ER diagram: typed ids, names that are
//! sanitized on construction so they always survive a trip through diagram
//! text, the [`Project`](project::Project) state container, and id-stable
//! reconciliation of re-parsed models.
//!
//! ```
//! use erdsync_core::project::{FieldDraft, Project};
//! use erdsync_core::types::FieldType;
//!
//! let mut project = Project::new("shop");
//! let users = project.add_entity("Users").expect("add entity");
//! project
//!     .add_field(&users, FieldDraft::new("id", FieldType::Int).primary_key())
//!     .expect("add field");
//!
//! assert_eq!(project.entities()[0].fields.len(), 1);
//! assert!(project.add_entity("users").is_err());
//! ```

pub mod error;
pub mod project;
pub mod reconcile;
pub mod types;

pub use error::ModelError;
pub use reconcile::reconcile;
