use crate::{
    error::CompileError,
    expr::{BinaryOp, SortDirection, TextOp},
    query::{
        path::{
            PathResolver, RelationPath, RelationStep, ResolvedPath, ScalarMember, TargetKind,
            Terminal,
        },
        predicate::{CompareOp, ComparePredicate, PredicateNode},
        shape::OrderKey,
    },
    value::{ScalarType, Value},
};

///
/// BoundPredicate
///
/// Predicate tree with every path resolved exactly once and every literal
/// checked against its member. Both the merge phase (requirements) and the
/// predicate compiler (expressions) consume this form, so they can never
/// disagree on optionality or cardinality.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum BoundPredicate {
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare(BoundCompare),
    /// Null-check on a single-valued relation; `path` ends at the relation.
    Presence { path: RelationPath, present: bool },
    Any(BoundQuantifier),
    All(BoundQuantifier),
}

///
/// BoundCompare
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BoundCompare {
    pub path: RelationPath,
    pub member: ScalarMember,
    pub test: ScalarTest,
}

///
/// ScalarTest
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ScalarTest {
    Binary(BinaryOp, Value),
    Null {
        negated: bool,
    },
    InList {
        items: Vec<Value>,
        negated: bool,
        /// The literal list contained `null`; compiled as a separate null-test.
        with_null: bool,
    },
    Text(TextOp, Value),
}

///
/// BoundQuantifier
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BoundQuantifier {
    /// Single-valued steps leading to the quantified relation.
    pub prefix: RelationPath,
    pub relation: RelationStep,
    /// Bound against the element entity of `relation`.
    pub child: Box<BoundPredicate>,
}

///
/// BoundOrderKey
///
/// Ordering key of a collection, resolved relative to its element entity.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BoundOrderKey {
    pub path: RelationPath,
    pub member: ScalarMember,
    pub direction: SortDirection,
}

///
/// Binder
///

#[derive(Clone, Copy, Debug)]
pub(crate) struct Binder<'a> {
    resolver: PathResolver<'a>,
}

impl<'a> Binder<'a> {
    pub(crate) const fn new(resolver: PathResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Bind `predicate` anchored at `entity`, which sits `depth` relations
    /// below the root under the dotted `prefix`.
    pub(crate) fn bind(
        &self,
        entity: &str,
        prefix: &str,
        depth: usize,
        predicate: &PredicateNode,
    ) -> Result<BoundPredicate, CompileError> {
        match predicate {
            PredicateNode::And(children) => Ok(BoundPredicate::And(
                self.bind_all(entity, prefix, depth, children)?,
            )),
            PredicateNode::Or(children) => Ok(BoundPredicate::Or(
                self.bind_all(entity, prefix, depth, children)?,
            )),
            PredicateNode::Not(child) => Ok(BoundPredicate::Not(Box::new(
                self.bind(entity, prefix, depth, child)?,
            ))),
            PredicateNode::Compare(cmp) => self.bind_compare(entity, prefix, depth, cmp),
            PredicateNode::Any { path, child } => Ok(BoundPredicate::Any(
                self.bind_quantifier(entity, prefix, depth, path, child)?,
            )),
            PredicateNode::All { path, child } => Ok(BoundPredicate::All(
                self.bind_quantifier(entity, prefix, depth, path, child)?,
            )),
        }
    }

    /// Bind one ordering key of a collection whose elements are `entity`.
    pub(crate) fn bind_order(
        &self,
        entity: &str,
        prefix: &str,
        depth: usize,
        key: &OrderKey,
    ) -> Result<BoundOrderKey, CompileError> {
        let resolved = self.resolver.resolve_in(entity, prefix, depth, &key.path)?;
        ensure_single_valued(&resolved.path, &resolved.display)?;

        let kind = resolved.target_kind();
        let Terminal::Scalar(member) = resolved.terminal else {
            return Err(CompileError::mismatch(
                resolved.display,
                TargetKind::Scalar,
                kind,
            ));
        };
        if !member.ty.is_orderable() {
            return Err(CompileError::UnorderableMember {
                path: resolved.display,
                ty: member.ty,
            });
        }

        Ok(BoundOrderKey {
            path: resolved.path,
            member,
            direction: key.direction,
        })
    }

    fn bind_all(
        &self,
        entity: &str,
        prefix: &str,
        depth: usize,
        children: &[PredicateNode],
    ) -> Result<Vec<BoundPredicate>, CompileError> {
        children
            .iter()
            .map(|child| self.bind(entity, prefix, depth, child))
            .collect()
    }

    fn bind_compare(
        &self,
        entity: &str,
        prefix: &str,
        depth: usize,
        cmp: &ComparePredicate,
    ) -> Result<BoundPredicate, CompileError> {
        let resolved = self.resolver.resolve_in(entity, prefix, depth, &cmp.path)?;
        ensure_single_valued(&resolved.prefix(), &resolved.display)?;

        match resolved.terminal {
            Terminal::Scalar(member) => {
                let test = bind_scalar_test(&member, cmp.op, &cmp.literal)?;
                Ok(BoundPredicate::Compare(BoundCompare {
                    path: resolved.path,
                    member,
                    test,
                }))
            }
            Terminal::Relation => bind_presence(resolved, cmp),
        }
    }

    fn bind_quantifier(
        &self,
        entity: &str,
        prefix: &str,
        depth: usize,
        path: &str,
        child: &PredicateNode,
    ) -> Result<BoundQuantifier, CompileError> {
        let resolved = self.resolver.resolve_in(entity, prefix, depth, path)?;
        let kind = resolved.target_kind();
        if kind != TargetKind::Many {
            return Err(CompileError::mismatch(
                resolved.display,
                TargetKind::Many,
                kind,
            ));
        }

        let Some((steps, relation)) = resolved.path.split_last() else {
            return Err(CompileError::mismatch(
                resolved.display,
                TargetKind::Many,
                TargetKind::Scalar,
            ));
        };
        ensure_single_valued(&steps, &resolved.display)?;

        let child = self.bind(
            &relation.target,
            &resolved.display,
            depth + resolved.path.len(),
            child,
        )?;

        Ok(BoundQuantifier {
            prefix: steps,
            relation: relation.clone(),
            child: Box::new(child),
        })
    }
}

// Comparisons and quantifier prefixes may only traverse single-valued steps;
// reaching through a collection requires an explicit quantifier.
pub(crate) fn ensure_single_valued(path: &RelationPath, display: &str) -> Result<(), CompileError> {
    if path.iter().any(RelationStep::is_many) {
        return Err(CompileError::mismatch(
            display,
            TargetKind::Single,
            TargetKind::Many,
        ));
    }

    Ok(())
}

fn bind_presence(
    resolved: ResolvedPath,
    cmp: &ComparePredicate,
) -> Result<BoundPredicate, CompileError> {
    let kind = resolved.target_kind();
    if kind != TargetKind::Single {
        return Err(CompileError::mismatch(
            resolved.display,
            TargetKind::Scalar,
            kind,
        ));
    }

    let present = match (cmp.op, &cmp.literal) {
        (CompareOp::IsNull | CompareOp::Eq, Value::Null) => false,
        (CompareOp::IsNotNull | CompareOp::Ne, Value::Null) => true,
        _ => {
            return Err(CompileError::mismatch(
                resolved.display,
                TargetKind::Scalar,
                kind,
            ));
        }
    };

    Ok(BoundPredicate::Presence {
        path: resolved.path,
        present,
    })
}

fn bind_scalar_test(
    member: &ScalarMember,
    op: CompareOp,
    literal: &Value,
) -> Result<ScalarTest, CompileError> {
    // Null literals never reach an equality operator.
    if literal.is_null() {
        return match op {
            CompareOp::Eq | CompareOp::IsNull => Ok(ScalarTest::Null { negated: false }),
            CompareOp::Ne | CompareOp::IsNotNull => Ok(ScalarTest::Null { negated: true }),
            _ => Err(CompileError::unsupported_literal(op, "null")),
        };
    }

    match op {
        CompareOp::IsNull | CompareOp::IsNotNull => {
            Err(CompileError::unsupported_literal(op, literal.type_label()))
        }
        CompareOp::Eq | CompareOp::Ne => {
            ensure_literal_type(op, member.ty, literal)?;
            let op = if op == CompareOp::Eq {
                BinaryOp::Eq
            } else {
                BinaryOp::Ne
            };
            Ok(ScalarTest::Binary(op, literal.clone()))
        }
        CompareOp::Lt | CompareOp::Lte | CompareOp::Gt | CompareOp::Gte => {
            if !member.ty.is_orderable() {
                return Err(CompileError::unsupported_literal(op, member.ty.to_string()));
            }
            ensure_literal_type(op, member.ty, literal)?;
            let op = match op {
                CompareOp::Lt => BinaryOp::Lt,
                CompareOp::Lte => BinaryOp::Lte,
                CompareOp::Gt => BinaryOp::Gt,
                _ => BinaryOp::Gte,
            };
            Ok(ScalarTest::Binary(op, literal.clone()))
        }
        CompareOp::In | CompareOp::NotIn => {
            let Value::List(list) = literal else {
                return Err(CompileError::unsupported_literal(op, literal.type_label()));
            };

            let mut items = Vec::with_capacity(list.len());
            let mut with_null = false;
            for item in list {
                if item.is_null() {
                    with_null = true;
                } else {
                    ensure_literal_type(op, member.ty, item)?;
                    items.push(item.clone());
                }
            }

            Ok(ScalarTest::InList {
                items,
                negated: op == CompareOp::NotIn,
                with_null,
            })
        }
        CompareOp::Contains | CompareOp::StartsWith | CompareOp::EndsWith => {
            if !member.ty.is_text() {
                return Err(CompileError::unsupported_literal(op, member.ty.to_string()));
            }
            ensure_literal_type(op, member.ty, literal)?;
            let text_op = match op {
                CompareOp::Contains => TextOp::Contains,
                CompareOp::StartsWith => TextOp::StartsWith,
                _ => TextOp::EndsWith,
            };
            Ok(ScalarTest::Text(text_op, literal.clone()))
        }
    }
}

fn ensure_literal_type(op: CompareOp, ty: ScalarType, literal: &Value) -> Result<(), CompileError> {
    if literal.matches_type(ty) {
        Ok(())
    } else {
        Err(CompileError::unsupported_literal(op, literal.type_label()))
    }
}
