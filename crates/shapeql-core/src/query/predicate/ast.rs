use crate::value::Value;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, Not};

///
/// Predicate tree
///
/// Schema-agnostic filter as handed over by the request parser. Paths are
/// dotted member references relative to the entity the predicate is
/// anchored at; nothing here is resolved or type-checked yet.
///

///
/// CompareOp
///
/// Closed operator set; every consumer matches exhaustively.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    #[display("eq")]
    Eq,
    #[display("ne")]
    Ne,
    #[display("lt")]
    Lt,
    #[display("lte")]
    Lte,
    #[display("gt")]
    Gt,
    #[display("gte")]
    Gte,
    #[display("in")]
    In,
    #[display("not_in")]
    NotIn,
    #[display("contains")]
    Contains,
    #[display("starts_with")]
    StartsWith,
    #[display("ends_with")]
    EndsWith,
    #[display("is_null")]
    IsNull,
    #[display("is_not_null")]
    IsNotNull,
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ComparePredicate {
    pub path: String,
    pub op: CompareOp,
    #[serde(default = "null_literal")]
    pub literal: Value,
}

const fn null_literal() -> Value {
    Value::Null
}

///
/// PredicateNode
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateNode {
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(ComparePredicate),
    /// At least one element of the multi-valued relation at `path` matches.
    Any { path: String, child: Box<Self> },
    /// Every element of the multi-valued relation at `path` matches.
    All { path: String, child: Box<Self> },
}

impl PredicateNode {
    // --- Connectives ---

    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    /// Always-true filter (the identity of `And`).
    #[must_use]
    pub const fn always() -> Self {
        Self::And(Vec::new())
    }

    /// Always-false filter (the identity of `Or`).
    #[must_use]
    pub const fn never() -> Self {
        Self::Or(Vec::new())
    }

    #[must_use]
    pub fn negate(child: Self) -> Self {
        Self::Not(Box::new(child))
    }

    // --- Quantifiers ---

    #[must_use]
    pub fn any(path: impl Into<String>, child: Self) -> Self {
        Self::Any {
            path: path.into(),
            child: Box::new(child),
        }
    }

    #[must_use]
    pub fn all(path: impl Into<String>, child: Self) -> Self {
        Self::All {
            path: path.into(),
            child: Box::new(child),
        }
    }

    // --- Comparisons ---

    #[must_use]
    pub fn compare(path: impl Into<String>, op: CompareOp, literal: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate {
            path: path.into(),
            op,
            literal: literal.into(),
        })
    }

    #[must_use]
    pub fn eq(path: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Eq, literal)
    }

    #[must_use]
    pub fn ne(path: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Ne, literal)
    }

    #[must_use]
    pub fn lt(path: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Lt, literal)
    }

    #[must_use]
    pub fn lte(path: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Lte, literal)
    }

    #[must_use]
    pub fn gt(path: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Gt, literal)
    }

    #[must_use]
    pub fn gte(path: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Gte, literal)
    }

    #[must_use]
    pub fn in_(path: impl Into<String>, literals: Vec<Value>) -> Self {
        Self::compare(path, CompareOp::In, Value::List(literals))
    }

    #[must_use]
    pub fn not_in(path: impl Into<String>, literals: Vec<Value>) -> Self {
        Self::compare(path, CompareOp::NotIn, Value::List(literals))
    }

    #[must_use]
    pub fn contains(path: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::Contains, literal)
    }

    #[must_use]
    pub fn starts_with(path: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::StartsWith, literal)
    }

    #[must_use]
    pub fn ends_with(path: impl Into<String>, literal: impl Into<Value>) -> Self {
        Self::compare(path, CompareOp::EndsWith, literal)
    }

    #[must_use]
    pub fn is_null(path: impl Into<String>) -> Self {
        Self::compare(path, CompareOp::IsNull, Value::Null)
    }

    #[must_use]
    pub fn is_not_null(path: impl Into<String>) -> Self {
        Self::compare(path, CompareOp::IsNotNull, Value::Null)
    }
}

impl BitAnd for PredicateNode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for PredicateNode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl Not for PredicateNode {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}
