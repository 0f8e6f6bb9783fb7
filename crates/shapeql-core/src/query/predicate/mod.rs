//! Filter predicates.
//!
//! `ast` is the unresolved tree handed over by the request parser, `bind`
//! resolves and type-checks it against relation metadata, and `compile`
//! lowers the bound form to a boolean expression.

mod ast;
pub(crate) mod bind;
pub(crate) mod compile;

#[cfg(test)]
mod tests;

// re-exports
pub use ast::{CompareOp, ComparePredicate, PredicateNode};
