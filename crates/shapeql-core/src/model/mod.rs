//! Relation metadata definitions.
//!
//! Types in `model` describe the backing entity graph the compiler resolves
//! against: which members each entity exposes, which of them are relations,
//! and how relation presence is probed. The metadata is supplied externally,
//! established once, and only ever read by compilation.
//!
//! In general:
//! - the schema layer (external) defines *what exists*
//! - `model` defines *what the compiler may traverse*
pub mod entity;
pub mod member;
pub mod schema;

// re-exports
pub use entity::EntityModel;
pub use member::{Cardinality, MemberKind, MemberModel};
pub use schema::{SchemaError, SchemaModel};
