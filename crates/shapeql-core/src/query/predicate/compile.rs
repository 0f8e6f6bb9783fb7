use crate::{
    error::CompileError,
    expr::Expr,
    query::{
        VarGen,
        guard::{guard, guard_then, navigate},
        path::{RelationPath, RelationStep},
        predicate::bind::{BoundCompare, BoundPredicate, BoundQuantifier, ScalarTest},
    },
};

///
/// PredicateCompiler
///
/// Compiles a bound predicate into a boolean expression over `base`, the
/// expression denoting the entity the predicate is anchored at.
///
/// Comparisons through optional relations are wrapped in the existence
/// guard so an absent relation makes them false rather than faulting.
/// Quantifiers over collections become correlated `Exists` expressions and
/// never materialize the child sequence.
///

pub(crate) struct PredicateCompiler<'v> {
    vars: &'v mut VarGen,
    fold: bool,
}

impl<'v> PredicateCompiler<'v> {
    pub(crate) const fn new(vars: &'v mut VarGen, fold: bool) -> Self {
        Self { vars, fold }
    }

    pub(crate) fn compile(
        &mut self,
        base: &Expr,
        predicate: &BoundPredicate,
    ) -> Result<Expr, CompileError> {
        match predicate {
            BoundPredicate::And(children) => {
                let children = self.compile_all(base, children)?;
                Ok(self.group(children, Expr::And, true))
            }
            BoundPredicate::Or(children) => {
                let children = self.compile_all(base, children)?;
                Ok(self.group(children, Expr::Or, false))
            }
            BoundPredicate::Not(child) => {
                let child = self.compile(base, child)?;
                Ok(self.negate(child))
            }
            BoundPredicate::Compare(cmp) => compile_compare(base, cmp),
            BoundPredicate::Presence { path, present } => {
                let present_expr = guard(base, path)?;
                if *present {
                    Ok(present_expr)
                } else {
                    Ok(self.negate(present_expr))
                }
            }
            BoundPredicate::Any(quantifier) => {
                self.compile_exists(base, &quantifier.prefix, &quantifier.relation, |this, elem| {
                    this.compile(elem, &quantifier.child)
                })
            }
            BoundPredicate::All(quantifier) => self.compile_all_quantifier(base, quantifier),
        }
    }

    fn compile_all(
        &mut self,
        base: &Expr,
        children: &[BoundPredicate],
    ) -> Result<Vec<Expr>, CompileError> {
        children
            .iter()
            .map(|child| self.compile(base, child))
            .collect()
    }

    // All(path, child) is compiled as !Any(path, !child), so an empty or
    // absent collection satisfies it.
    fn compile_all_quantifier(
        &mut self,
        base: &Expr,
        quantifier: &BoundQuantifier,
    ) -> Result<Expr, CompileError> {
        let counterexample =
            self.compile_exists(base, &quantifier.prefix, &quantifier.relation, |this, elem| {
                let child = this.compile(elem, &quantifier.child)?;
                Ok(this.negate(child))
            })?;

        Ok(self.negate(counterexample))
    }

    fn compile_exists(
        &mut self,
        base: &Expr,
        prefix: &RelationPath,
        relation: &RelationStep,
        element: impl FnOnce(&mut Self, &Expr) -> Result<Expr, CompileError>,
    ) -> Result<Expr, CompileError> {
        let param = self.vars.fresh();
        let predicate = element(self, &Expr::Var(param))?;
        let source = Expr::member(navigate(base, prefix.iter()), &relation.member);

        let exists = Expr::Exists {
            source: Box::new(source),
            param,
            predicate: Box::new(predicate),
        };

        guard_then(base, prefix, exists, &Expr::Bool(false))
    }

    fn group(&self, mut children: Vec<Expr>, make: fn(Vec<Expr>) -> Expr, identity: bool) -> Expr {
        match children.len() {
            0 => Expr::Bool(identity),
            1 if self.fold => children.remove(0),
            _ => make(children),
        }
    }

    fn negate(&self, expr: Expr) -> Expr {
        match expr {
            Expr::Bool(value) if self.fold => Expr::Bool(!value),
            Expr::Not(inner) if self.fold => *inner,
            other => Expr::not(other),
        }
    }
}

fn compile_compare(base: &Expr, cmp: &BoundCompare) -> Result<Expr, CompileError> {
    let operand = Expr::member(navigate(base, cmp.path.iter()), &cmp.member.name);
    let test = scalar_test(operand, &cmp.test);

    guard_then(base, &cmp.path, test, &Expr::Bool(false))
}

fn scalar_test(operand: Expr, test: &ScalarTest) -> Expr {
    match test {
        ScalarTest::Binary(op, literal) => Expr::Compare {
            op: *op,
            left: Box::new(operand),
            right: Box::new(Expr::Literal(literal.clone())),
        },
        ScalarTest::Null { negated } => Expr::IsNull {
            operand: Box::new(operand),
            negated: *negated,
        },
        ScalarTest::InList {
            items,
            negated,
            with_null,
        } => {
            let null_test = Expr::IsNull {
                operand: Box::new(operand.clone()),
                negated: *negated,
            };
            if *with_null && items.is_empty() {
                return null_test;
            }

            let membership = Expr::InList {
                operand: Box::new(operand),
                items: items.clone(),
                negated: *negated,
            };
            match (*with_null, *negated) {
                (false, _) => membership,
                (true, false) => Expr::Or(vec![null_test, membership]),
                (true, true) => Expr::And(vec![null_test, membership]),
            }
        }
        ScalarTest::Text(op, pattern) => Expr::Text {
            op: *op,
            operand: Box::new(operand),
            pattern: pattern.clone(),
        },
    }
}
