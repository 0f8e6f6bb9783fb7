//! Projection compiler.
//!
//! Lowers a `CompiledNode` to a construction expression. Optional
//! single-valued relations construct their object only behind the
//! existence guard and yield `absent` otherwise; collections compile to
//! filter, then order, then project over the child sequence.

use crate::{
    config::CompileConfig,
    error::CompileError,
    expr::{ConstructMember, Expr, SortKey, Visibility},
    query::{
        VarGen,
        guard::{guard_then, navigate},
        plan::{CompiledNode, RelationSlot, SlotKey},
        predicate::{bind::BoundOrderKey, compile::PredicateCompiler},
    },
    value::Value,
};
use std::slice;

///
/// ProjectionCompiler
///

pub(crate) struct ProjectionCompiler<'c> {
    vars: &'c mut VarGen,
    config: &'c CompileConfig,
}

impl<'c> ProjectionCompiler<'c> {
    pub(crate) const fn new(vars: &'c mut VarGen, config: &'c CompileConfig) -> Self {
        Self { vars, config }
    }

    /// Construction of `node` where `base` denotes one present instance of
    /// its entity. Inner relations are lowered before the construct that
    /// contains them.
    pub(crate) fn construct(
        &mut self,
        node: &CompiledNode,
        base: &Expr,
    ) -> Result<Expr, CompileError> {
        let mut members = Vec::with_capacity(node.slots.len());

        for slot in &node.slots {
            match *slot {
                SlotKey::Scalar(index) => {
                    let scalar = &node.scalars[index];
                    let Some(visibility) = self.visibility(scalar.emit) else {
                        continue;
                    };
                    members.push(ConstructMember {
                        name: scalar.member.clone(),
                        value: Expr::member(base.clone(), &scalar.member),
                        visibility,
                    });
                }
                SlotKey::Relation(index) => {
                    let relation = &node.relations[index];
                    // Collections needed only by a filter stay correlated.
                    if !relation.node.emit && relation.step.is_many() {
                        continue;
                    }
                    let Some(visibility) = self.visibility(relation.node.emit) else {
                        continue;
                    };
                    members.push(ConstructMember {
                        name: relation.step.member.clone(),
                        value: self.relation(relation, base)?,
                        visibility,
                    });
                }
            }
        }

        Ok(Expr::Construct {
            entity: node.entity.clone(),
            members,
        })
    }

    /// Filter, order and project the sequence `source` whose elements are
    /// instances of `node`.
    pub(crate) fn sequence(
        &mut self,
        node: &CompiledNode,
        source: Expr,
    ) -> Result<Expr, CompileError> {
        let mut source = source;

        if let Some(filter) = &node.filter {
            let param = self.vars.fresh();
            let predicate = PredicateCompiler::new(self.vars, self.config.fold_constants)
                .compile(&Expr::Var(param), filter)?;
            if !(self.config.fold_constants && predicate.is_true()) {
                source = Expr::Filter {
                    source: Box::new(source),
                    param,
                    predicate: Box::new(predicate),
                };
            }
        }

        if !node.order.is_empty() {
            let param = self.vars.fresh();
            let keys = sort_keys(&Expr::Var(param), &node.order)?;
            source = Expr::OrderBy {
                source: Box::new(source),
                param,
                keys,
            };
        }

        let param = self.vars.fresh();
        let selector = self.construct(node, &Expr::Var(param))?;

        Ok(Expr::Project {
            source: Box::new(source),
            param,
            selector: Box::new(selector),
        })
    }

    fn relation(&mut self, relation: &RelationSlot, base: &Expr) -> Result<Expr, CompileError> {
        let target = Expr::member(base.clone(), &relation.step.member);

        if relation.step.is_many() {
            return self.sequence(&relation.node, target);
        }

        let body = self.construct(&relation.node, &target)?;
        guard_then(base, slice::from_ref(&relation.step), body, &Expr::Absent)
    }

    const fn visibility(&self, emit: bool) -> Option<Visibility> {
        match (emit, self.config.shadow_members) {
            (true, _) => Some(Visibility::Emitted),
            (false, true) => Some(Visibility::Shadow),
            (false, false) => None,
        }
    }
}

/// Sort keys over the element bound to `element`. Keys reading through an
/// absent optional relation sort as null.
pub(crate) fn sort_keys(
    element: &Expr,
    order: &[BoundOrderKey],
) -> Result<Vec<SortKey>, CompileError> {
    order
        .iter()
        .map(|key| {
            let value = Expr::member(navigate(element, key.path.iter()), &key.member.name);
            let key_expr = guard_then(element, &key.path, value, &Expr::Literal(Value::Null))?;

            Ok(SortKey {
                key: key_expr,
                direction: key.direction,
            })
        })
        .collect()
}
