//! Existence guard.
//!
//! Presence of an optional single-valued relation is decided once, on its
//! probe member, and never inferred from the nullness of ordinary fields.
//! Guards nest: a step's probe is only read after every enclosing guarded
//! step has been proven present.

use crate::{error::CompileError, expr::Expr, query::path::RelationStep};

/// Navigate `steps` from `base` without any presence checks.
#[must_use]
pub(crate) fn navigate<'s>(base: &Expr, steps: impl IntoIterator<Item = &'s RelationStep>) -> Expr {
    steps
        .into_iter()
        .fold(base.clone(), |expr, step| Expr::member(expr, &step.member))
}

/// Boolean guard: true iff every optional single-valued step is present.
pub(crate) fn guard(base: &Expr, steps: &[RelationStep]) -> Result<Expr, CompileError> {
    guard_then(base, steps, Expr::Bool(true), &Expr::Bool(false))
}

/// Evaluate `body` only when every guarded step along `steps` is present,
/// otherwise `otherwise`. Compiles to nested conditionals ordered
/// outermost-first: each guarded step tests the relation reference, then
/// its probe, so nothing is read under an absent ancestor.
pub(crate) fn guard_then(
    base: &Expr,
    steps: &[RelationStep],
    body: Expr,
    otherwise: &Expr,
) -> Result<Expr, CompileError> {
    let mut tests = Vec::new();
    let mut current = base.clone();
    let mut walked = Vec::with_capacity(steps.len());

    for step in steps {
        current = Expr::member(current, &step.member);
        walked.push(step.member.as_str());

        if step.needs_guard() {
            let Some(probe) = &step.probe else {
                return Err(CompileError::MissingProbeMember {
                    path: walked.join("."),
                });
            };
            tests.push(Expr::is_not_null(current.clone()));
            tests.push(Expr::is_not_null(Expr::member(current.clone(), probe)));
        }
    }

    Ok(tests
        .into_iter()
        .rev()
        .fold(body, |acc, test| Expr::conditional(test, acc, otherwise.clone())))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{expr::Var, model::Cardinality};

    fn step(member: &str, optional: bool, probe: Option<&str>) -> RelationStep {
        RelationStep {
            member: member.to_string(),
            source: "Source".to_string(),
            target: "Target".to_string(),
            cardinality: Cardinality::Single,
            optional,
            probe: probe.map(str::to_string),
        }
    }

    fn x0() -> Expr {
        Expr::Var(Var(0))
    }

    #[test]
    fn required_steps_are_not_guarded() {
        let steps = [step("foo", false, Some("id"))];
        let expr = guard(&x0(), &steps).expect("guard");

        assert_eq!(expr, Expr::Bool(true));
    }

    #[test]
    fn guards_nest_outermost_first() {
        let steps = [
            step("foo", true, Some("id")),
            step("inner", false, Some("id")),
            step("deep", true, Some("key")),
        ];
        let expr = guard_then(&x0(), &steps, Expr::Bool(true), &Expr::Absent).expect("guard");

        assert_eq!(
            expr.to_string(),
            concat!(
                "(if (x0.foo != null) then (if (x0.foo.id != null) then ",
                "(if (x0.foo.inner.deep != null) then (if (x0.foo.inner.deep.key != null) then ",
                "true else absent) else absent) else absent) else absent)",
            )
        );
    }

    #[test]
    fn missing_probe_fails_closed() {
        let steps = [step("foo", false, None), step("bar", true, None)];
        let err = guard(&x0(), &steps).expect_err("probe missing");

        assert_eq!(
            err,
            CompileError::MissingProbeMember {
                path: "foo.bar".to_string(),
            }
        );
    }

    #[test]
    fn navigate_follows_every_step() {
        let steps = [step("foo", true, Some("id")), step("bar", false, None)];

        assert_eq!(navigate(&x0(), &steps).to_string(), "x0.foo.bar");
    }
}
