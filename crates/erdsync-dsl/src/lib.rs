//! # erdsync-dsl
//!
//! Reading and writing Mermaid-style `erDiagram` text.
//!
//! This crate provides:
//! - A per-line lexer built on logos
//! - A tolerant parser that turns diagram text into entities, binding
//!   relationship lines to foreign-key fields through a pluggable resolver
//! - A generator that renders entities back to canonical text
//! - [`SyncController`], which keeps a text buffer and a project in step
//!
//! # Example
//!
//! ```
//! use erdsync_dsl::{generate, parse};
//!
//! let source = r#"erDiagram
//!   "Users" {
//!     int id PK
//!     string email
//!   }
//!   "Posts" {
//!     int id PK
//!     int user_id FK
//!   }
//!   "Posts" }o--|| "Users" : "by user_id""#;
//!
//! let diagram = parse(source).expect("parse failed");
//! assert_eq!(diagram.entities.len(), 2);
//! assert!(diagram.warnings.is_empty());
//!
//! let text = generate(&diagram.entities);
//! assert!(text.contains(r#""Posts" }o--|| "Users" : "by user_id""#));
//! ```

pub mod error;
pub mod generator;
mod lexer;
pub mod parser;
pub mod resolver;
pub mod sync;
pub mod token;

pub use error::{ParseError, ParseErrorKind, ParseWarning, Span, WarningKind};
pub use generator::generate;
pub use parser::{parse, parse_with, Diagram, HEADER};
pub use resolver::{FkResolver, HeuristicResolver, LabelResolver};
pub use sync::{SyncController, SyncOutcome, DEFAULT_DEBOUNCE};
