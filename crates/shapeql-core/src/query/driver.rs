//! Compiler driver.
//!
//! Three strictly ordered phases, each consuming the output of the last:
//! Merge (shape + filter into one `CompiledNode` tree), Compile (predicate
//! and projection fragments, inner relations first) and Assemble
//! (`root.filter(..).order_by(..).project(..)`). Any phase error aborts the
//! whole compilation.

use crate::{
    config::CompileConfig,
    error::CompileError,
    expr::{Expr, ExprFingerprint, SortKey, Var},
    model::SchemaModel,
    obs::{CompilePhase, CompileTraceSink, TraceScope},
    query::{
        VarGen,
        path::PathResolver,
        plan::{CompiledNode, Merger},
        predicate::{PredicateNode, bind::BoundPredicate, compile::PredicateCompiler},
        projection::{ProjectionCompiler, sort_keys},
        shape::{OrderKey, ShapeNode},
    },
};
use serde::{Deserialize, Serialize};

///
/// CompileRequest
///
/// One incoming request as handed over by the request parser.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CompileRequest {
    pub entity: String,
    pub shape: Vec<ShapeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<PredicateNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<OrderKey>,
}

impl CompileRequest {
    #[must_use]
    pub fn new(entity: impl Into<String>, shape: impl IntoIterator<Item = ShapeNode>) -> Self {
        Self {
            entity: entity.into(),
            shape: shape.into_iter().collect(),
            filter: None,
            order: Vec::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: PredicateNode) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn order_by(mut self, key: OrderKey) -> Self {
        self.order.push(key);
        self
    }
}

///
/// CompiledQuery
///
/// The composite expression plus its fingerprint. Never partial.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    expr: Expr,
    fingerprint: ExprFingerprint,
}

impl CompiledQuery {
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    #[must_use]
    pub fn into_expr(self) -> Expr {
        self.expr
    }

    #[must_use]
    pub const fn fingerprint(&self) -> ExprFingerprint {
        self.fingerprint
    }

    #[must_use]
    pub fn explain(&self) -> String {
        self.expr.to_string()
    }
}

///
/// Compiler
///
/// Borrows the relation metadata; holds no per-request state, so one
/// compiler can serve concurrent requests.
///

#[derive(Clone, Copy)]
pub struct Compiler<'a> {
    schema: &'a SchemaModel,
    config: &'a CompileConfig,
    trace: Option<&'a dyn CompileTraceSink>,
}

impl<'a> Compiler<'a> {
    #[must_use]
    pub const fn new(schema: &'a SchemaModel, config: &'a CompileConfig) -> Self {
        Self {
            schema,
            config,
            trace: None,
        }
    }

    #[must_use]
    pub const fn with_trace(mut self, sink: &'a dyn CompileTraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    pub fn compile(&self, request: &CompileRequest) -> Result<CompiledQuery, CompileError> {
        let scope = TraceScope::start(self.trace, &request.entity);

        let merged = match self.merge(request) {
            Ok(merged) => merged,
            Err(err) => {
                scope.failed(CompilePhase::Merge, &err);
                return Err(err);
            }
        };
        scope.phase(CompilePhase::Merge, merged.root.node_count());

        let fragments = match merged.compile(self.config) {
            Ok(fragments) => fragments,
            Err(err) => {
                scope.failed(CompilePhase::Compile, &err);
                return Err(err);
            }
        };
        scope.phase(CompilePhase::Compile, fragments.node_count());

        let expr = fragments.assemble();
        let nodes = expr.node_count();
        scope.phase(CompilePhase::Assemble, nodes);

        let fingerprint = expr.fingerprint();
        scope.finish(fingerprint, nodes);

        Ok(CompiledQuery { expr, fingerprint })
    }

    fn merge(&self, request: &CompileRequest) -> Result<MergedPlan, CompileError> {
        let resolver = PathResolver::new(self.schema, self.config.max_depth);
        let root = Merger::new(resolver, self.config.max_depth).merge(
            &request.entity,
            &request.shape,
            request.filter.as_ref(),
            &request.order,
        )?;

        Ok(MergedPlan { root })
    }
}

///
/// MergedPlan
///

struct MergedPlan {
    root: CompiledNode,
}

impl MergedPlan {
    fn compile(self, config: &CompileConfig) -> Result<CompiledFragments, CompileError> {
        let mut vars = VarGen::default();
        let root = self.root;

        let filter = match (&root.filter, config.fold_constants) {
            (None, true) => None,
            (filter, _) => {
                let param = vars.fresh();
                let unfiltered = BoundPredicate::And(Vec::new());
                let predicate = PredicateCompiler::new(&mut vars, config.fold_constants)
                    .compile(&Expr::Var(param), filter.as_ref().unwrap_or(&unfiltered))?;

                if config.fold_constants && predicate.is_true() {
                    None
                } else {
                    Some((param, predicate))
                }
            }
        };

        let order = if root.order.is_empty() {
            None
        } else {
            let param = vars.fresh();
            Some((param, sort_keys(&Expr::Var(param), &root.order)?))
        };

        let param = vars.fresh();
        let selector =
            ProjectionCompiler::new(&mut vars, config).construct(&root, &Expr::Var(param))?;

        tracing::trace!(entity = %root.entity, vars = vars.allocated(), "compiled root fragments");

        Ok(CompiledFragments {
            entity: root.entity,
            filter,
            order,
            projection: (param, selector),
        })
    }
}

///
/// CompiledFragments
///

struct CompiledFragments {
    entity: String,
    filter: Option<(Var, Expr)>,
    order: Option<(Var, Vec<SortKey>)>,
    projection: (Var, Expr),
}

impl CompiledFragments {
    fn node_count(&self) -> usize {
        let filter = self
            .filter
            .as_ref()
            .map_or(0, |(_, expr)| expr.node_count());
        let order = self.order.as_ref().map_or(0, |(_, keys)| {
            keys.iter().map(|key| key.key.node_count()).sum()
        });

        filter + order + self.projection.1.node_count()
    }

    fn assemble(self) -> Expr {
        let mut expr = Expr::Source {
            entity: self.entity,
        };

        if let Some((param, predicate)) = self.filter {
            expr = Expr::Filter {
                source: Box::new(expr),
                param,
                predicate: Box::new(predicate),
            };
        }

        if let Some((param, keys)) = self.order {
            expr = Expr::OrderBy {
                source: Box::new(expr),
                param,
                keys,
            };
        }

        let (param, selector) = self.projection;
        Expr::Project {
            source: Box::new(expr),
            param,
            selector: Box::new(selector),
        }
    }
}
