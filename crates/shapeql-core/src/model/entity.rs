use crate::{
    model::member::{Cardinality, MemberKind, MemberModel},
    value::ScalarType,
};
use serde::{Deserialize, Serialize};

///
/// EntityModel
///
/// Relation metadata for one entity type. Member order is the declaration
/// order and is preserved for diagnostics; lookups are by name.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityModel {
    pub name: String,
    /// Identity key; default probe for relations targeting this entity.
    #[serde(default)]
    pub key: Option<String>,
    pub members: Vec<MemberModel>,
}

impl EntityModel {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            members: Vec::new(),
        }
    }

    /// Declare a non-nullable identity key and use it as the default probe.
    #[must_use]
    pub fn key(mut self, name: impl Into<String>, ty: ScalarType) -> Self {
        let name = name.into();
        self.key = Some(name.clone());
        self.member(
            name,
            MemberKind::Scalar {
                ty,
                nullable: false,
            },
        )
    }

    #[must_use]
    pub fn scalar(self, name: impl Into<String>, ty: ScalarType) -> Self {
        self.member(
            name,
            MemberKind::Scalar {
                ty,
                nullable: false,
            },
        )
    }

    #[must_use]
    pub fn nullable(self, name: impl Into<String>, ty: ScalarType) -> Self {
        self.member(name, MemberKind::Scalar { ty, nullable: true })
    }

    /// Required single-valued relation (inner-join semantics).
    #[must_use]
    pub fn one(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation(name, target, Cardinality::Single, false)
    }

    /// Optional single-valued relation (outer-join semantics).
    #[must_use]
    pub fn optional(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation(name, target, Cardinality::Single, true)
    }

    #[must_use]
    pub fn many(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relation(name, target, Cardinality::Many, false)
    }

    /// Override the probe member of the most recently declared relation.
    #[must_use]
    pub fn probed_by(mut self, probe: impl Into<String>) -> Self {
        if let Some(MemberModel {
            kind: MemberKind::Relation { probe: slot, .. },
            ..
        }) = self.members.last_mut()
        {
            *slot = Some(probe.into());
        }

        self
    }

    #[must_use]
    pub fn member_named(&self, name: &str) -> Option<&MemberModel> {
        self.members.iter().find(|member| member.name == name)
    }

    fn relation(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        cardinality: Cardinality,
        optional: bool,
    ) -> Self {
        self.member(
            name,
            MemberKind::Relation {
                target: target.into(),
                cardinality,
                optional,
                probe: None,
            },
        )
    }

    fn member(mut self, name: impl Into<String>, kind: MemberKind) -> Self {
        self.members.push(MemberModel {
            name: name.into(),
            kind,
        });
        self
    }
}
