use crate::value::ScalarType;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Cardinality
///
/// Whether a relation step yields one related entity or a sequence.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    #[display("single")]
    Single,
    #[display("many")]
    Many,
}

///
/// MemberKind
///
/// Declared shape of one member. Relations carry the metadata the path
/// resolver needs: target entity, cardinality, optionality and the probe
/// member used to decide presence.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberKind {
    Scalar {
        ty: ScalarType,
        #[serde(default)]
        nullable: bool,
    },
    Relation {
        target: String,
        cardinality: Cardinality,
        #[serde(default)]
        optional: bool,
        /// Explicit probe; falls back to the target entity key when absent.
        #[serde(default)]
        probe: Option<String>,
    },
}

///
/// MemberModel
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MemberModel {
    pub name: String,
    #[serde(flatten)]
    pub kind: MemberKind,
}

impl MemberModel {
    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self.kind, MemberKind::Relation { .. })
    }

    /// Declared scalar type and nullability, if this member is a scalar.
    #[must_use]
    pub const fn scalar(&self) -> Option<(ScalarType, bool)> {
        match self.kind {
            MemberKind::Scalar { ty, nullable } => Some((ty, nullable)),
            MemberKind::Relation { .. } => None,
        }
    }

    /// Whether this member can serve as a presence probe.
    #[must_use]
    pub const fn is_probe_capable(&self) -> bool {
        matches!(
            self.kind,
            MemberKind::Scalar {
                nullable: false,
                ..
            }
        )
    }
}
