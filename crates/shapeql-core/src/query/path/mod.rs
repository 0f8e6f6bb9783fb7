//! Resolved relation paths.
//!
//! Both the shape tree and the predicate tree name members by dotted
//! references. Resolution turns those into one shared, typed route so the
//! driver never re-derives optionality or cardinality twice.

mod resolve;


use crate::value::ScalarType;
use derive_more::{Deref, Display, IntoIterator};

// re-exports
pub use crate::model::Cardinality;
pub use resolve::PathResolver;
pub(crate) use resolve::ResolvedMember;

///
/// TargetKind
///
/// What a reference resolves to, used for cardinality diagnostics.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum TargetKind {
    #[display("scalar")]
    Scalar,
    #[display("single-valued relation")]
    Single,
    #[display("multi-valued relation")]
    Many,
}

impl From<Cardinality> for TargetKind {
    fn from(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Single => Self::Single,
            Cardinality::Many => Self::Many,
        }
    }
}

///
/// RelationStep
///
/// One traversal from an entity to a related entity.
/// `probe` is the member whose non-null value proves the related row exists;
/// it is always present for optional single-valued steps.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RelationStep {
    pub member: String,
    pub source: String,
    pub target: String,
    pub cardinality: Cardinality,
    pub optional: bool,
    pub probe: Option<String>,
}

impl RelationStep {
    /// Optional single-valued steps are the only ones the existence guard tests.
    #[must_use]
    pub const fn needs_guard(&self) -> bool {
        self.optional && matches!(self.cardinality, Cardinality::Single)
    }

    #[must_use]
    pub const fn is_many(&self) -> bool {
        matches!(self.cardinality, Cardinality::Many)
    }
}

///
/// RelationPath
///
/// Ordered relation steps from an anchor entity. Empty for members of the
/// anchor itself.
///

#[derive(Clone, Debug, Default, Deref, Eq, Hash, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct RelationPath(Vec<RelationStep>);

impl RelationPath {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, step: RelationStep) {
        self.0.push(step);
    }

    /// Split off the final step, if any.
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, &RelationStep)> {
        let (last, init) = self.0.split_last()?;
        Some((Self(init.to_vec()), last))
    }

    /// Whether any step would require an existence guard.
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        self.0.iter().any(RelationStep::needs_guard)
    }

    #[must_use]
    pub fn dotted(&self) -> String {
        self.0
            .iter()
            .map(|step| step.member.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

///
/// ScalarMember
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ScalarMember {
    pub name: String,
    pub ty: ScalarType,
    pub nullable: bool,
}

///
/// Terminal
///
/// What the final segment of a reference names. For `Relation`, the
/// relation itself is the last step of the accompanying path.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Terminal {
    Scalar(ScalarMember),
    Relation,
}

///
/// ResolvedPath
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedPath {
    pub path: RelationPath,
    pub terminal: Terminal,
    /// Fully qualified dotted reference, for diagnostics.
    pub display: String,
}

impl ResolvedPath {
    #[must_use]
    pub fn target_kind(&self) -> TargetKind {
        match (&self.terminal, self.path.last()) {
            (Terminal::Scalar(_), _) | (Terminal::Relation, None) => TargetKind::Scalar,
            (Terminal::Relation, Some(step)) => step.cardinality.into(),
        }
    }

    /// Relation steps traversed before the terminal.
    #[must_use]
    pub fn prefix(&self) -> RelationPath {
        match self.terminal {
            Terminal::Scalar(_) => self.path.clone(),
            Terminal::Relation => self
                .path
                .split_last()
                .map(|(init, _)| init)
                .unwrap_or_default(),
        }
    }
}
