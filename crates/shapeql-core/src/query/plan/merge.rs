use crate::{
    error::CompileError,
    query::{
        path::{PathResolver, ResolvedMember, TargetKind},
        plan::CompiledNode,
        predicate::{PredicateNode, bind::Binder},
        shape::{OrderKey, ShapeNode},
    },
};

///
/// Merger
///
/// Walks the shape tree and the predicate trees in lock-step by relation
/// path and produces the `CompiledNode` tree. Every path is resolved once
/// here; later phases only read the resolved steps.
///

#[derive(Clone, Copy, Debug)]
pub(crate) struct Merger<'a> {
    resolver: PathResolver<'a>,
    binder: Binder<'a>,
    max_depth: usize,
}

impl<'a> Merger<'a> {
    pub(crate) const fn new(resolver: PathResolver<'a>, max_depth: usize) -> Self {
        Self {
            resolver,
            binder: Binder::new(resolver),
            max_depth,
        }
    }

    /// Build the plan rooted at `entity`.
    pub(crate) fn merge(
        &self,
        entity: &str,
        shape: &[ShapeNode],
        filter: Option<&PredicateNode>,
        order: &[OrderKey],
    ) -> Result<CompiledNode, CompileError> {
        self.resolver.entity(entity)?;

        let mut root = CompiledNode::root(entity);
        self.merge_shape(&mut root, shape)?;
        self.merge_arguments(&mut root, filter, order)?;

        Ok(root)
    }

    fn merge_shape(
        &self,
        node: &mut CompiledNode,
        shape: &[ShapeNode],
    ) -> Result<(), CompileError> {
        let entity = self.resolver.entity(&node.entity)?;

        for requested in shape {
            let display = if node.display.is_empty() {
                requested.member.clone()
            } else {
                format!("{}.{}", node.display, requested.member)
            };

            match self.resolver.member(entity, &display, &requested.member)? {
                ResolvedMember::Scalar(member) => {
                    if !requested.children.is_empty() {
                        return Err(CompileError::InvalidPathThroughScalar { path: display });
                    }
                    if has_arguments(requested) {
                        return Err(CompileError::mismatch(
                            display,
                            TargetKind::Many,
                            TargetKind::Scalar,
                        ));
                    }
                    node.ensure_scalar(&member.name, true);
                }
                ResolvedMember::Relation(step) => {
                    if node.depth + 1 > self.max_depth {
                        return Err(CompileError::DepthLimitExceeded {
                            path: display,
                            limit: self.max_depth,
                        });
                    }
                    if !step.is_many() && has_arguments(requested) {
                        return Err(CompileError::mismatch(
                            display,
                            TargetKind::Many,
                            TargetKind::Single,
                        ));
                    }

                    let child = node.ensure_relation(&step, true);
                    self.merge_shape(child, &requested.children)?;
                    self.merge_arguments(child, requested.filter.as_ref(), &requested.order)?;
                }
            }
        }

        Ok(())
    }

    // Element filter and ordering of `node`, bound against its own entity.
    fn merge_arguments(
        &self,
        node: &mut CompiledNode,
        filter: Option<&PredicateNode>,
        order: &[OrderKey],
    ) -> Result<(), CompileError> {
        if let Some(filter) = filter {
            let bound = self
                .binder
                .bind(&node.entity, &node.display, node.depth, filter)?;
            node.require(&bound);
            node.filter = Some(bound);
        }

        for key in order {
            let bound = self
                .binder
                .bind_order(&node.entity, &node.display, node.depth, key)?;
            node.require_order(&bound);
            node.order.push(bound);
        }

        Ok(())
    }
}

fn has_arguments(node: &ShapeNode) -> bool {
    node.filter.is_some() || !node.order.is_empty()
}
