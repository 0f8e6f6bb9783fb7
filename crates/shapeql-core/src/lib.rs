//! Projection–filter compiler.
//!
//! Turns a requested output shape plus a filter predicate into one
//! composite, backend-neutral query expression. Optional single-valued
//! relations are guarded by a probe member so an outer-join miss surfaces
//! as an absent object, never as an object whose fields are all null.

pub mod config;
pub mod error;
pub mod eval;
pub mod expr;
pub mod model;
pub mod obs;
pub mod query;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Everything a caller needs to describe metadata, build a request and
/// compile it.
///

pub mod prelude {
    pub use crate::{
        config::CompileConfig,
        error::{CompileError, ErrorClass},
        expr::{Expr, ExprFingerprint, SortDirection},
        model::{Cardinality, EntityModel, SchemaModel},
        query::{CompileRequest, CompiledQuery, Compiler, PredicateNode, ShapeNode},
        value::{ScalarType, Value},
    };
}
