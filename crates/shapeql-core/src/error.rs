use crate::{
    query::{path::TargetKind, predicate::CompareOp},
    value::ScalarType,
};
use derive_more::Display;
use thiserror::Error as ThisError;

///
/// CompileError
///
/// Synchronous compilation failure. Every variant indicates a malformed
/// request/metadata pairing; none are retried and no partial expression
/// accompanies them.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    #[error("unknown member '{path}'")]
    UnknownMember { path: String },

    #[error("path '{path}' continues past a scalar member")]
    InvalidPathThroughScalar { path: String },

    #[error("'{path}' expected a {expected} member but resolved to a {actual} member")]
    CardinalityMismatch {
        path: String,
        expected: TargetKind,
        actual: TargetKind,
    },

    #[error("optional relation '{path}' has no usable non-nullable probe member")]
    MissingProbeMember { path: String },

    #[error("operator {op} does not accept a {ty} literal")]
    UnsupportedLiteral { op: CompareOp, ty: String },

    #[error("member '{path}' of type {ty} cannot be ordered")]
    UnorderableMember { path: String, ty: ScalarType },

    #[error("path '{path}' exceeds the relation depth limit of {limit}")]
    DepthLimitExceeded { path: String, limit: usize },
}

impl CompileError {
    pub(crate) fn unsupported_literal(op: CompareOp, ty: impl Into<String>) -> Self {
        Self::UnsupportedLiteral { op, ty: ty.into() }
    }

    pub(crate) fn mismatch(
        path: impl Into<String>,
        expected: TargetKind,
        actual: TargetKind,
    ) -> Self {
        Self::CardinalityMismatch {
            path: path.into(),
            expected,
            actual,
        }
    }

    /// Coarse classification for callers translating to protocol errors.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownMember { .. }
            | Self::InvalidPathThroughScalar { .. }
            | Self::CardinalityMismatch { .. }
            | Self::UnsupportedLiteral { .. }
            | Self::UnorderableMember { .. } => ErrorClass::Request,
            Self::UnknownEntity { .. } | Self::MissingProbeMember { .. } => ErrorClass::Schema,
            Self::DepthLimitExceeded { .. } => ErrorClass::Limit,
        }
    }
}

///
/// ErrorClass
///
/// Who has to act on a compile failure: the requester (malformed shape or
/// filter), the schema owner (metadata cannot support the request), or the
/// operator (configured limits).
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    #[display("request")]
    Request,
    #[display("schema")]
    Schema,
    #[display("limit")]
    Limit,
}
