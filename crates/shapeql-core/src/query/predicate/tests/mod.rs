
use crate::{
    error::CompileError,
    expr::Expr,
    model::SchemaModel,
    query::{
        VarGen,
        path::PathResolver,
        predicate::{
            PredicateNode,
            bind::{Binder, BoundPredicate},
            compile::PredicateCompiler,
        },
    },
};

fn bind_at(
    schema: &SchemaModel,
    entity: &str,
    predicate: &PredicateNode,
) -> Result<BoundPredicate, CompileError> {
    Binder::new(PathResolver::new(schema, 32)).bind(entity, "", 0, predicate)
}

fn compile_at(
    schema: &SchemaModel,
    entity: &str,
    predicate: &PredicateNode,
    fold: bool,
) -> Result<Expr, CompileError> {
    let bound = bind_at(schema, entity, predicate)?;
    let mut vars = VarGen::default();
    let base = Expr::Var(vars.fresh());

    PredicateCompiler::new(&mut vars, fold).compile(&base, &bound)
}
