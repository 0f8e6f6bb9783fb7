//! Query compilation.
//!
//! A request is a shape tree plus an optional filter. Compilation resolves
//! both against relation metadata, merges them into one traversal plan and
//! lowers that plan to a single composite expression.

pub mod driver;
pub mod path;
pub mod predicate;
pub mod shape;

pub(crate) mod guard;
pub(crate) mod plan;
pub(crate) mod projection;


use crate::expr::Var;

// re-exports
pub use driver::{CompileRequest, CompiledQuery, Compiler};
pub use path::{PathResolver, RelationPath, RelationStep, TargetKind};
pub use predicate::{CompareOp, ComparePredicate, PredicateNode};
pub use shape::{OrderKey, ShapeNode};

///
/// VarGen
///
/// Per-compilation lambda parameter allocator. Allocation order follows the
/// compile walk, which is deterministic for a given request.
///

#[derive(Debug, Default)]
pub(crate) struct VarGen {
    next: u32,
}

impl VarGen {
    pub(crate) const fn fresh(&mut self) -> Var {
        let var = Var(self.next);
        self.next += 1;
        var
    }

    pub(crate) const fn allocated(&self) -> u32 {
        self.next
    }
}
