//! Deterministic expression fingerprinting.
#![allow(clippy::cast_possible_truncation)]

use crate::{
    expr::{BinaryOp, Expr, SortDirection, TextOp, Visibility},
    value::Value,
};
use sha2::{Digest, Sha256};

///
/// ExprFingerprint
///
/// Stable SHA-256 digest of a canonical expression encoding. Two
/// compilations of the same request against the same metadata always
/// produce the same fingerprint.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExprFingerprint([u8; 32]);

impl ExprFingerprint {
    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.as_bytes() {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ExprFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl Expr {
    /// Compute a stable fingerprint for this expression.
    #[must_use]
    pub fn fingerprint(&self) -> ExprFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(b"exprfp:v1");
        hash_expr(&mut hasher, self);
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        ExprFingerprint(out)
    }
}

fn hash_expr(hasher: &mut Sha256, expr: &Expr) {
    match expr {
        Expr::Source { entity } => {
            write_tag(hasher, 0x01);
            write_str(hasher, entity);
        }
        Expr::Var(var) => {
            write_tag(hasher, 0x02);
            write_u32(hasher, var.0);
        }
        Expr::Member { base, member } => {
            write_tag(hasher, 0x03);
            hash_expr(hasher, base);
            write_str(hasher, member);
        }
        Expr::Literal(value) => {
            write_tag(hasher, 0x04);
            write_value(hasher, value);
        }
        Expr::Bool(value) => {
            write_tag(hasher, 0x05);
            write_tag(hasher, u8::from(*value));
        }
        Expr::Compare { op, left, right } => {
            write_tag(hasher, 0x10);
            write_tag(hasher, binary_tag(*op));
            hash_expr(hasher, left);
            hash_expr(hasher, right);
        }
        Expr::IsNull { operand, negated } => {
            write_tag(hasher, 0x11);
            write_tag(hasher, u8::from(*negated));
            hash_expr(hasher, operand);
        }
        Expr::InList {
            operand,
            items,
            negated,
        } => {
            write_tag(hasher, 0x12);
            write_tag(hasher, u8::from(*negated));
            hash_expr(hasher, operand);
            write_u32(hasher, items.len() as u32);
            for item in items {
                write_value(hasher, item);
            }
        }
        Expr::Text {
            op,
            operand,
            pattern,
        } => {
            write_tag(hasher, 0x13);
            write_tag(hasher, text_tag(*op));
            hash_expr(hasher, operand);
            write_value(hasher, pattern);
        }
        Expr::And(children) => {
            write_tag(hasher, 0x20);
            hash_all(hasher, children);
        }
        Expr::Or(children) => {
            write_tag(hasher, 0x21);
            hash_all(hasher, children);
        }
        Expr::Not(operand) => {
            write_tag(hasher, 0x22);
            hash_expr(hasher, operand);
        }
        Expr::Conditional {
            test,
            then,
            otherwise,
        } => {
            write_tag(hasher, 0x23);
            hash_expr(hasher, test);
            hash_expr(hasher, then);
            hash_expr(hasher, otherwise);
        }
        Expr::Exists {
            source,
            param,
            predicate,
        } => {
            write_tag(hasher, 0x30);
            hash_expr(hasher, source);
            write_u32(hasher, param.0);
            hash_expr(hasher, predicate);
        }
        Expr::Filter {
            source,
            param,
            predicate,
        } => {
            write_tag(hasher, 0x31);
            hash_expr(hasher, source);
            write_u32(hasher, param.0);
            hash_expr(hasher, predicate);
        }
        Expr::OrderBy {
            source,
            param,
            keys,
        } => {
            write_tag(hasher, 0x32);
            hash_expr(hasher, source);
            write_u32(hasher, param.0);
            write_u32(hasher, keys.len() as u32);
            for key in keys {
                hash_expr(hasher, &key.key);
                write_tag(
                    hasher,
                    match key.direction {
                        SortDirection::Asc => 0x01,
                        SortDirection::Desc => 0x02,
                    },
                );
            }
        }
        Expr::Project {
            source,
            param,
            selector,
        } => {
            write_tag(hasher, 0x33);
            hash_expr(hasher, source);
            write_u32(hasher, param.0);
            hash_expr(hasher, selector);
        }
        Expr::Construct { entity, members } => {
            write_tag(hasher, 0x40);
            write_str(hasher, entity);
            write_u32(hasher, members.len() as u32);
            for member in members {
                write_str(hasher, &member.name);
                write_tag(
                    hasher,
                    match member.visibility {
                        Visibility::Emitted => 0x01,
                        Visibility::Shadow => 0x02,
                    },
                );
                hash_expr(hasher, &member.value);
            }
        }
        Expr::Absent => write_tag(hasher, 0x41),
    }
}

fn hash_all(hasher: &mut Sha256, children: &[Expr]) {
    write_u32(hasher, children.len() as u32);
    for child in children {
        hash_expr(hasher, child);
    }
}

const fn binary_tag(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Eq => 0x01,
        BinaryOp::Ne => 0x02,
        BinaryOp::Lt => 0x03,
        BinaryOp::Lte => 0x04,
        BinaryOp::Gt => 0x05,
        BinaryOp::Gte => 0x06,
    }
}

const fn text_tag(op: TextOp) -> u8 {
    match op {
        TextOp::Contains => 0x01,
        TextOp::StartsWith => 0x02,
        TextOp::EndsWith => 0x03,
    }
}

fn write_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => write_tag(hasher, 0x00),
        Value::Bool(v) => {
            write_tag(hasher, 0x01);
            write_tag(hasher, u8::from(*v));
        }
        Value::Enum(v) => {
            write_tag(hasher, 0x02);
            write_str(hasher, v);
        }
        Value::Float(v) => {
            write_tag(hasher, 0x03);
            hasher.update(v.to_bits().to_be_bytes());
        }
        Value::Int(v) => {
            write_tag(hasher, 0x04);
            hasher.update(v.to_be_bytes());
        }
        Value::List(items) => {
            write_tag(hasher, 0x05);
            write_u32(hasher, items.len() as u32);
            for item in items {
                write_value(hasher, item);
            }
        }
        Value::Text(v) => {
            write_tag(hasher, 0x06);
            write_str(hasher, v);
        }
        Value::Timestamp(v) => {
            write_tag(hasher, 0x07);
            hasher.update(v.to_be_bytes());
        }
        Value::Uint(v) => {
            write_tag(hasher, 0x08);
            hasher.update(v.to_be_bytes());
        }
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

#[cfg(test)]
mod tests {
    use crate::{
        expr::{BinaryOp, Expr, Var},
        value::Value,
    };

    fn sample(literal: &str) -> Expr {
        Expr::Filter {
            source: Box::new(Expr::Source {
                entity: "Bar".into(),
            }),
            param: Var(0),
            predicate: Box::new(Expr::Compare {
                op: BinaryOp::Eq,
                left: Box::new(Expr::member(Expr::Var(Var(0)), "id")),
                right: Box::new(Expr::Literal(Value::text(literal))),
            }),
        }
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(sample("a").fingerprint(), sample("a").fingerprint());
        assert_eq!(sample("a").fingerprint().as_hex().len(), 64);
    }

    #[test]
    fn fingerprint_tracks_literals() {
        assert_ne!(sample("a").fingerprint(), sample("b").fingerprint());
    }

    #[test]
    fn explain_renders_lambda_form() {
        assert_eq!(
            sample("a").to_string(),
            r#"Bar.filter(x0 => (x0.id == "a"))"#
        );
    }
}
