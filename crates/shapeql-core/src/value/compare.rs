use crate::{expr::TextOp, value::Value};
use std::{cmp::Ordering, mem::discriminant};

///
/// Runtime comparison semantics for literals.
///
/// A null operand never compares equal, ordered, or matching; callers
/// that need null semantics test for null explicitly.
///

/// Strict equality between two non-null values of the same variant.
#[must_use]
pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    if left.is_null() || right.is_null() {
        return false;
    }

    same_variant(left, right) && left == right
}

/// Ordering between two non-null values of the same orderable variant.
#[must_use]
pub(crate) fn compare_order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Int(a), Value::Int(b)) | (Value::Timestamp(a), Value::Timestamp(b)) => {
            Some(a.cmp(b))
        }
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Uint(a), Value::Uint(b)) => Some(a.cmp(b)),
        _ => {
            // NOTE: mixed or non-orderable variants do not define ordering.
            None
        }
    }
}

/// Case-sensitive text matching; non-text operands never match.
#[must_use]
pub(crate) fn text_match(op: TextOp, value: &Value, pattern: &Value) -> bool {
    let (Value::Text(value), Value::Text(pattern)) = (value, pattern) else {
        return false;
    };

    match op {
        TextOp::Contains => value.contains(pattern.as_str()),
        TextOp::StartsWith => value.starts_with(pattern.as_str()),
        TextOp::EndsWith => value.ends_with(pattern.as_str()),
    }
}

fn same_variant(left: &Value, right: &Value) -> bool {
    discriminant(left) == discriminant(right)
}
