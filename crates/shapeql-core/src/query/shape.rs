use crate::{expr::SortDirection, query::predicate::PredicateNode};
use serde::{Deserialize, Serialize};

///
/// ShapeNode
///
/// One requested member. For relations, `children` describe the requested
/// shape of the related entity (of each element, for multi-valued
/// relations). `filter` and `order` are collection arguments and are only
/// legal on multi-valued relations; their paths are relative to the
/// element entity.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ShapeNode {
    pub member: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<PredicateNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<OrderKey>,
}

impl ShapeNode {
    /// Request a scalar member.
    #[must_use]
    pub fn field(member: impl Into<String>) -> Self {
        Self {
            member: member.into(),
            children: Vec::new(),
            filter: None,
            order: Vec::new(),
        }
    }

    /// Request a relation with the given element shape.
    #[must_use]
    pub fn relation(member: impl Into<String>, children: impl IntoIterator<Item = Self>) -> Self {
        Self {
            children: children.into_iter().collect(),
            ..Self::field(member)
        }
    }

    /// Attach an element filter (multi-valued relations only).
    #[must_use]
    pub fn filtered(mut self, filter: PredicateNode) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Append an ordering key (multi-valued relations only).
    #[must_use]
    pub fn ordered_by(mut self, path: impl Into<String>, direction: SortDirection) -> Self {
        self.order.push(OrderKey {
            path: path.into(),
            direction,
        });
        self
    }
}

///
/// OrderKey
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OrderKey {
    pub path: String,
    #[serde(default)]
    pub direction: SortDirection,
}
