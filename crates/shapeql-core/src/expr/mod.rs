//! Composite query expression.
//!
//! The compiler's only output: an abstract, backend-neutral expression over
//! the root sequence. Sequence operators (`Filter`, `OrderBy`, `Project`,
//! `Exists`) bind one lambda parameter each, so a backend can translate
//! them to correlated sub-queries without materializing child sequences.

mod explain;
mod fingerprint;

use crate::value::Value;
use derive_more::Display;
use serde::{Deserialize, Serialize};

// re-exports
pub use fingerprint::ExprFingerprint;

///
/// Var
///
/// Lambda parameter. Numbered per compilation in allocation order, so the
/// same request always yields the same names.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[display("x{_0}")]
pub struct Var(pub u32);

///
/// BinaryOp
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    #[display("==")]
    Eq,
    #[display("!=")]
    Ne,
    #[display("<")]
    Lt,
    #[display("<=")]
    Lte,
    #[display(">")]
    Gt,
    #[display(">=")]
    Gte,
}

///
/// TextOp
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOp {
    #[display("contains")]
    Contains,
    #[display("starts_with")]
    StartsWith,
    #[display("ends_with")]
    EndsWith,
}

///
/// Visibility
///
/// `Shadow` members are carried only because a filter or existence guard
/// needs them; evaluators drop them from the emitted result.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Emitted,
    Shadow,
}

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    #[display("asc")]
    Asc,
    #[display("desc")]
    Desc,
}

///
/// ConstructMember
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConstructMember {
    pub name: String,
    pub value: Expr,
    pub visibility: Visibility,
}

///
/// SortKey
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SortKey {
    pub key: Expr,
    pub direction: SortDirection,
}

///
/// Expr
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Root sequence of an entity type.
    Source { entity: String },
    Var(Var),
    Member { base: Box<Self>, member: String },
    Literal(Value),
    Bool(bool),

    Compare {
        op: BinaryOp,
        left: Box<Self>,
        right: Box<Self>,
    },
    IsNull { operand: Box<Self>, negated: bool },
    InList {
        operand: Box<Self>,
        items: Vec<Value>,
        negated: bool,
    },
    Text {
        op: TextOp,
        operand: Box<Self>,
        pattern: Value,
    },

    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    /// Only the taken branch is evaluated.
    Conditional {
        test: Box<Self>,
        then: Box<Self>,
        otherwise: Box<Self>,
    },

    /// Correlated existential test over a sequence.
    Exists {
        source: Box<Self>,
        param: Var,
        predicate: Box<Self>,
    },
    Filter {
        source: Box<Self>,
        param: Var,
        predicate: Box<Self>,
    },
    OrderBy {
        source: Box<Self>,
        param: Var,
        keys: Vec<SortKey>,
    },
    Project {
        source: Box<Self>,
        param: Var,
        selector: Box<Self>,
    },

    Construct {
        entity: String,
        members: Vec<ConstructMember>,
    },
    /// The related object does not exist.
    Absent,
}

impl Expr {
    #[must_use]
    pub fn member(base: Self, member: impl Into<String>) -> Self {
        Self::Member {
            base: Box::new(base),
            member: member.into(),
        }
    }

    #[must_use]
    pub fn is_null(operand: Self) -> Self {
        Self::IsNull {
            operand: Box::new(operand),
            negated: false,
        }
    }

    #[must_use]
    pub fn is_not_null(operand: Self) -> Self {
        Self::IsNull {
            operand: Box::new(operand),
            negated: true,
        }
    }

    #[must_use]
    pub fn conditional(test: Self, then: Self, otherwise: Self) -> Self {
        Self::Conditional {
            test: Box::new(test),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    #[must_use]
    #[expect(clippy::should_implement_trait)]
    pub fn not(operand: Self) -> Self {
        Self::Not(Box::new(operand))
    }

    /// Whether this expression is the literal `true`.
    #[must_use]
    pub const fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// Number of nodes, used for trace reporting.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + match self {
            Self::Source { .. }
            | Self::Var(_)
            | Self::Literal(_)
            | Self::Bool(_)
            | Self::Absent => 0,
            Self::Member { base, .. } => base.node_count(),
            Self::Compare { left, right, .. } => left.node_count() + right.node_count(),
            Self::IsNull { operand, .. }
            | Self::InList { operand, .. }
            | Self::Text { operand, .. }
            | Self::Not(operand) => operand.node_count(),
            Self::And(children) | Self::Or(children) => children.iter().map(Self::node_count).sum(),
            Self::Conditional {
                test,
                then,
                otherwise,
            } => test.node_count() + then.node_count() + otherwise.node_count(),
            Self::Exists {
                source, predicate, ..
            }
            | Self::Filter {
                source, predicate, ..
            } => source.node_count() + predicate.node_count(),
            Self::OrderBy { source, keys, .. } => {
                source.node_count() + keys.iter().map(|k| k.key.node_count()).sum::<usize>()
            }
            Self::Project {
                source, selector, ..
            } => source.node_count() + selector.node_count(),
            Self::Construct { members, .. } => members.iter().map(|m| m.value.node_count()).sum(),
        }
    }
}
