//! Merged traversal plan.
//!
//! One `CompiledNode` per distinct relation path, carrying both the
//! requested members and the members filters and guards need there.

mod merge;


use crate::query::{
    path::{RelationPath, RelationStep},
    predicate::bind::{BoundOrderKey, BoundPredicate},
};

// re-exports
pub(crate) use merge::Merger;

///
/// SlotKey
///
/// Position of a member in declaration order of first use.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SlotKey {
    Scalar(usize),
    Relation(usize),
}

///
/// ScalarSlot
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ScalarSlot {
    pub member: String,
    /// Requested by the shape; otherwise carried only for filters/guards.
    pub emit: bool,
}

///
/// RelationSlot
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RelationSlot {
    pub step: RelationStep,
    pub node: CompiledNode,
}

///
/// CompiledNode
///
/// Shape and predicate requirements for one relation path. A node whose
/// `emit` flag is false is a shadow node: traversed because a filter or
/// guard reads through it, but never part of the requested output.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CompiledNode {
    pub entity: String,
    /// Dotted path from the root; empty for the root itself.
    pub display: String,
    pub depth: usize,
    pub emit: bool,
    pub slots: Vec<SlotKey>,
    pub scalars: Vec<ScalarSlot>,
    pub relations: Vec<RelationSlot>,
    /// Element filter; root filter or collection argument.
    pub filter: Option<BoundPredicate>,
    pub order: Vec<BoundOrderKey>,
}

impl CompiledNode {
    pub(crate) fn root(entity: impl Into<String>) -> Self {
        Self::new(entity.into(), String::new(), 0, true)
    }

    const fn new(entity: String, display: String, depth: usize, emit: bool) -> Self {
        Self {
            entity,
            display,
            depth,
            emit,
            slots: Vec::new(),
            scalars: Vec::new(),
            relations: Vec::new(),
            filter: None,
            order: Vec::new(),
        }
    }

    /// Ensure a scalar slot exists; `emit` only ever upgrades.
    pub(crate) fn ensure_scalar(&mut self, member: &str, emit: bool) {
        if let Some(slot) = self.scalars.iter_mut().find(|slot| slot.member == member) {
            slot.emit |= emit;
            return;
        }

        self.slots.push(SlotKey::Scalar(self.scalars.len()));
        self.scalars.push(ScalarSlot {
            member: member.to_string(),
            emit,
        });
    }

    /// Ensure a relation slot exists and return its node. Guarded steps
    /// always carry their probe member.
    pub(crate) fn ensure_relation(&mut self, step: &RelationStep, emit: bool) -> &mut Self {
        let index = if let Some(index) = self
            .relations
            .iter()
            .position(|slot| slot.step.member == step.member)
        {
            index
        } else {
            let display = if self.display.is_empty() {
                step.member.clone()
            } else {
                format!("{}.{}", self.display, step.member)
            };
            let mut node = Self::new(step.target.clone(), display, self.depth + 1, false);
            if step.needs_guard()
                && let Some(probe) = &step.probe
            {
                node.ensure_scalar(probe, false);
            }

            self.slots.push(SlotKey::Relation(self.relations.len()));
            self.relations.push(RelationSlot {
                step: step.clone(),
                node,
            });
            self.relations.len() - 1
        };

        let node = &mut self.relations[index].node;
        node.emit |= emit;
        node
    }

    /// Walk `path` as shadow relations and return the node it ends at.
    pub(crate) fn ensure_path(&mut self, path: &RelationPath) -> &mut Self {
        let mut node = self;
        for step in path {
            node = node.ensure_relation(step, false);
        }
        node
    }

    /// Register every member `predicate` reads, anchored at this node.
    /// Collections under a quantifier stay correlated and are not added.
    pub(crate) fn require(&mut self, predicate: &BoundPredicate) {
        match predicate {
            BoundPredicate::And(children) | BoundPredicate::Or(children) => {
                for child in children {
                    self.require(child);
                }
            }
            BoundPredicate::Not(child) => self.require(child),
            BoundPredicate::Compare(cmp) => {
                self.ensure_path(&cmp.path)
                    .ensure_scalar(&cmp.member.name, false);
            }
            BoundPredicate::Presence { path, .. } => {
                self.ensure_path(path);
            }
            BoundPredicate::Any(quantifier) | BoundPredicate::All(quantifier) => {
                self.ensure_path(&quantifier.prefix);
            }
        }
    }

    /// Register the members an ordering key reads.
    pub(crate) fn require_order(&mut self, key: &BoundOrderKey) {
        self.ensure_path(&key.path)
            .ensure_scalar(&key.member.name, false);
    }

    /// Number of nodes in this subtree, for trace reporting.
    #[must_use]
    pub(crate) fn node_count(&self) -> usize {
        1 + self
            .relations
            .iter()
            .map(|slot| slot.node.node_count())
            .sum::<usize>()
    }

    #[cfg(test)]
    pub(crate) fn child(&self, member: &str) -> Option<&Self> {
        self.relations
            .iter()
            .find(|slot| slot.step.member == member)
            .map(|slot| &slot.node)
    }

    #[cfg(test)]
    pub(crate) fn scalar(&self, member: &str) -> Option<&ScalarSlot> {
        self.scalars.iter().find(|slot| slot.member == member)
    }
}
