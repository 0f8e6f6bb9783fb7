//! Human-readable rendering of compiled expressions.
//!
//! The rendering is stable for a given expression and is what explain
//! surfaces and snapshot-style tests compare against.

use crate::expr::{ConstructMember, Expr, SortKey, Visibility};
use std::fmt::{self, Display, Formatter};

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source { entity } => f.write_str(entity),
            Self::Var(var) => write!(f, "{var}"),
            Self::Member { base, member } => write!(f, "{base}.{member}"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),

            Self::Compare { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::IsNull { operand, negated } => {
                let op = if *negated { "!=" } else { "==" };
                write!(f, "({operand} {op} null)")
            }
            Self::InList {
                operand,
                items,
                negated,
            } => {
                let op = if *negated { "not in" } else { "in" };
                write!(f, "({operand} {op} [")?;
                write_separated(f, items, ", ")?;
                f.write_str("])")
            }
            Self::Text {
                op,
                operand,
                pattern,
            } => write!(f, "{operand}.{op}({pattern})"),

            Self::And(children) if children.is_empty() => f.write_str("true"),
            Self::Or(children) if children.is_empty() => f.write_str("false"),
            Self::And(children) => write_group(f, children, " && "),
            Self::Or(children) => write_group(f, children, " || "),
            Self::Not(operand) => write!(f, "!{operand}"),
            Self::Conditional {
                test,
                then,
                otherwise,
            } => write!(f, "(if {test} then {then} else {otherwise})"),

            Self::Exists {
                source,
                param,
                predicate,
            } => write!(f, "{source}.any({param} => {predicate})"),
            Self::Filter {
                source,
                param,
                predicate,
            } => write!(f, "{source}.filter({param} => {predicate})"),
            Self::OrderBy {
                source,
                param,
                keys,
            } => {
                write!(f, "{source}.order_by({param} => ")?;
                write_separated(f, keys, ", ")?;
                f.write_str(")")
            }
            Self::Project {
                source,
                param,
                selector,
            } => write!(f, "{source}.project({param} => {selector})"),

            Self::Construct { entity, members } => {
                write!(f, "{entity} {{ ")?;
                write_separated(f, members, ", ")?;
                f.write_str(" }")
            }
            Self::Absent => f.write_str("absent"),
        }
    }
}

impl Display for ConstructMember {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.visibility == Visibility::Shadow {
            f.write_str("~")?;
        }
        write!(f, "{}: {}", self.name, self.value)
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.direction)
    }
}

fn write_group(f: &mut Formatter<'_>, children: &[Expr], separator: &str) -> fmt::Result {
    f.write_str("(")?;
    write_separated(f, children, separator)?;
    f.write_str(")")
}

fn write_separated<T: Display>(f: &mut Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }

    Ok(())
}
