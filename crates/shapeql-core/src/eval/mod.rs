//! Reference evaluator.
//!
//! Evaluates a compiled expression against in-memory datasets. It stands in
//! for a backend in tests and examples and is not tuned for production
//! data volumes.

mod datum;


use crate::{
    expr::{BinaryOp, Expr, SortDirection, Var, Visibility},
    value::{Value, compare_order, text_match, values_equal},
};
use std::{cmp::Ordering, collections::BTreeMap};
use thiserror::Error as ThisError;

// re-exports
pub use datum::{Dataset, Datum};

///
/// EvalError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum EvalError {
    #[error("null reference reading member '{member}'")]
    NullReference { member: String },

    #[error("unbound variable {var}")]
    UnboundVariable { var: Var },

    #[error("member '{member}' read from a non-record value")]
    NotARecord { member: String },

    #[error("expected a sequence")]
    NotASequence,

    #[error("expected a boolean")]
    NotABoolean,

    #[error("unknown source entity '{entity}'")]
    UnknownSource { entity: String },
}

///
/// NullSemantics
///
/// How member access on an absent object behaves. `Strict` models an
/// object-graph provider that faults; `Propagate` models a relational
/// left join that yields a row of nulls.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NullSemantics {
    #[default]
    Strict,
    Propagate,
}

///
/// Evaluator
///

#[derive(Clone, Copy, Debug)]
pub struct Evaluator<'a> {
    data: &'a Dataset,
    semantics: NullSemantics,
}

impl<'a> Evaluator<'a> {
    #[must_use]
    pub const fn new(data: &'a Dataset, semantics: NullSemantics) -> Self {
        Self { data, semantics }
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Datum, EvalError> {
        self.eval(expr, &mut Vec::new())
    }

    fn eval(&self, expr: &Expr, env: &mut Vec<(Var, Datum)>) -> Result<Datum, EvalError> {
        match expr {
            Expr::Source { entity } => self
                .data
                .rows(entity)
                .map(|rows| Datum::List(rows.to_vec()))
                .ok_or_else(|| EvalError::UnknownSource {
                    entity: entity.clone(),
                }),
            Expr::Var(var) => env
                .iter()
                .rev()
                .find(|(bound, _)| bound == var)
                .map(|(_, datum)| datum.clone())
                .ok_or(EvalError::UnboundVariable { var: *var }),
            Expr::Member { base, member } => {
                let base = self.eval(base, env)?;
                self.member(&base, member)
            }
            Expr::Literal(value) => Ok(Datum::from(value.clone())),
            Expr::Bool(value) => Ok(boolean(*value)),

            Expr::Compare { op, left, right } => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                Ok(boolean(compare(*op, &left, &right)))
            }
            Expr::IsNull { operand, negated } => {
                let operand = self.eval(operand, env)?;
                Ok(boolean(operand.is_null() != *negated))
            }
            Expr::InList {
                operand,
                items,
                negated,
            } => {
                let operand = self.eval(operand, env)?;
                // A null operand is neither in nor out of any list.
                let result = operand.as_value().is_some_and(|value| {
                    items.iter().any(|item| values_equal(value, item)) != *negated
                });
                Ok(boolean(result))
            }
            Expr::Text {
                op,
                operand,
                pattern,
            } => {
                let operand = self.eval(operand, env)?;
                let result = operand
                    .as_value()
                    .is_some_and(|value| text_match(*op, value, pattern));
                Ok(boolean(result))
            }

            Expr::And(children) => {
                for child in children {
                    if !self.truth(child, env)? {
                        return Ok(boolean(false));
                    }
                }
                Ok(boolean(true))
            }
            Expr::Or(children) => {
                for child in children {
                    if self.truth(child, env)? {
                        return Ok(boolean(true));
                    }
                }
                Ok(boolean(false))
            }
            Expr::Not(operand) => Ok(boolean(!self.truth(operand, env)?)),
            Expr::Conditional {
                test,
                then,
                otherwise,
            } => {
                if self.truth(test, env)? {
                    self.eval(then, env)
                } else {
                    self.eval(otherwise, env)
                }
            }

            Expr::Exists {
                source,
                param,
                predicate,
            } => {
                for element in self.sequence(source, env)? {
                    if self.bound_truth(*param, element, predicate, env)? {
                        return Ok(boolean(true));
                    }
                }
                Ok(boolean(false))
            }
            Expr::Filter {
                source,
                param,
                predicate,
            } => {
                let mut kept = Vec::new();
                for element in self.sequence(source, env)? {
                    if self.bound_truth(*param, element.clone(), predicate, env)? {
                        kept.push(element);
                    }
                }
                Ok(Datum::List(kept))
            }
            Expr::OrderBy {
                source,
                param,
                keys,
            } => {
                let mut keyed = Vec::new();
                for element in self.sequence(source, env)? {
                    env.push((*param, element.clone()));
                    let values = keys
                        .iter()
                        .map(|key| self.eval(&key.key, env))
                        .collect::<Result<Vec<_>, _>>();
                    env.pop();
                    keyed.push((values?, element));
                }

                keyed.sort_by(|(left, _), (right, _)| {
                    keys.iter()
                        .zip(left.iter().zip(right))
                        .map(|(key, (l, r))| match key.direction {
                            SortDirection::Asc => sort_order(l, r),
                            SortDirection::Desc => sort_order(r, l),
                        })
                        .find(|ordering| ordering.is_ne())
                        .unwrap_or(Ordering::Equal)
                });

                Ok(Datum::List(
                    keyed.into_iter().map(|(_, element)| element).collect(),
                ))
            }
            Expr::Project {
                source,
                param,
                selector,
            } => {
                let mut projected = Vec::new();
                for element in self.sequence(source, env)? {
                    env.push((*param, element));
                    let result = self.eval(selector, env);
                    env.pop();
                    projected.push(result?);
                }
                Ok(Datum::List(projected))
            }

            Expr::Construct { members, .. } => {
                let mut record = BTreeMap::new();
                for member in members {
                    let value = self.eval(&member.value, env)?;
                    if member.visibility == Visibility::Emitted {
                        record.insert(member.name.clone(), value);
                    }
                }
                Ok(Datum::Record(record))
            }
            Expr::Absent => Ok(Datum::Null),
        }
    }

    fn member(&self, base: &Datum, member: &str) -> Result<Datum, EvalError> {
        match base {
            Datum::Record(members) => Ok(members.get(member).cloned().unwrap_or(Datum::Null)),
            Datum::Null => match self.semantics {
                NullSemantics::Strict => Err(EvalError::NullReference {
                    member: member.to_string(),
                }),
                NullSemantics::Propagate => Ok(Datum::Null),
            },
            Datum::Value(_) | Datum::List(_) => Err(EvalError::NotARecord {
                member: member.to_string(),
            }),
        }
    }

    // A null collection member is an empty sequence.
    fn sequence(
        &self,
        source: &Expr,
        env: &mut Vec<(Var, Datum)>,
    ) -> Result<Vec<Datum>, EvalError> {
        match self.eval(source, env)? {
            Datum::List(items) => Ok(items),
            Datum::Null => Ok(Vec::new()),
            Datum::Value(_) | Datum::Record(_) => Err(EvalError::NotASequence),
        }
    }

    fn truth(&self, expr: &Expr, env: &mut Vec<(Var, Datum)>) -> Result<bool, EvalError> {
        match self.eval(expr, env)? {
            Datum::Value(Value::Bool(value)) => Ok(value),
            _ => Err(EvalError::NotABoolean),
        }
    }

    fn bound_truth(
        &self,
        param: Var,
        element: Datum,
        predicate: &Expr,
        env: &mut Vec<(Var, Datum)>,
    ) -> Result<bool, EvalError> {
        env.push((param, element));
        let result = self.truth(predicate, env);
        env.pop();
        result
    }
}

const fn boolean(value: bool) -> Datum {
    Datum::Value(Value::Bool(value))
}

// Comparisons involving null are false for every operator.
fn compare(op: BinaryOp, left: &Datum, right: &Datum) -> bool {
    let (Some(left), Some(right)) = (left.as_value(), right.as_value()) else {
        return false;
    };

    match op {
        BinaryOp::Eq => values_equal(left, right),
        BinaryOp::Ne => {
            left.scalar_type().is_some()
                && left.scalar_type() == right.scalar_type()
                && !values_equal(left, right)
        }
        BinaryOp::Lt => compare_order(left, right).is_some_and(Ordering::is_lt),
        BinaryOp::Lte => compare_order(left, right).is_some_and(Ordering::is_le),
        BinaryOp::Gt => compare_order(left, right).is_some_and(Ordering::is_gt),
        BinaryOp::Gte => compare_order(left, right).is_some_and(Ordering::is_ge),
    }
}

// Nulls sort first; incomparable values keep their relative order.
fn sort_order(left: &Datum, right: &Datum) -> Ordering {
    match (left.as_value(), right.as_value()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(l), Some(r)) => compare_order(l, r).unwrap_or(Ordering::Equal),
    }
}
