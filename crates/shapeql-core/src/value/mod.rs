mod compare;


use derive_more::Display;
use serde::{Deserialize, Serialize};

// re-exports
pub(crate) use compare::{compare_order, text_match, values_equal};

///
/// ScalarType
///
/// Declared type of a scalar member in relation metadata.
/// Literals in predicates are checked against this before compilation.
///

#[derive(Clone, Copy, Debug, Display, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    #[display("bool")]
    Bool,
    #[display("enum")]
    Enum,
    #[display("float")]
    Float,
    #[display("int")]
    Int,
    #[display("text")]
    Text,
    #[display("timestamp")]
    Timestamp,
    #[display("uint")]
    Uint,
}

impl ScalarType {
    /// Whether ordering operators (`<`, `<=`, `>`, `>=`) are defined.
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        matches!(
            self,
            Self::Float | Self::Int | Self::Text | Self::Timestamp | Self::Uint
        )
    }

    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

///
/// Value
///
/// Literal value carried by predicates and produced by the evaluator.
/// `Null` is a first-class literal; comparisons against it are compiled
/// to explicit null tests, never to equality.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Enum(String),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    Text(String),
    Timestamp(i64),
    Uint(u64),
}

impl Value {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn enumeration(variant: impl Into<String>) -> Self {
        Self::Enum(variant.into())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalar type of a non-null, non-list literal.
    #[must_use]
    pub const fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Bool(_) => Some(ScalarType::Bool),
            Self::Enum(_) => Some(ScalarType::Enum),
            Self::Float(_) => Some(ScalarType::Float),
            Self::Int(_) => Some(ScalarType::Int),
            Self::Text(_) => Some(ScalarType::Text),
            Self::Timestamp(_) => Some(ScalarType::Timestamp),
            Self::Uint(_) => Some(ScalarType::Uint),
            Self::Null | Self::List(_) => None,
        }
    }

    /// Short label used in error messages.
    #[must_use]
    pub fn type_label(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::List(_) => "list".to_string(),
            other => other
                .scalar_type()
                .map_or_else(|| "unknown".to_string(), |ty| ty.to_string()),
        }
    }

    /// Whether this literal can be compared against a member of `ty`.
    #[must_use]
    pub fn matches_type(&self, ty: ScalarType) -> bool {
        self.scalar_type() == Some(ty)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Enum(variant) => f.write_str(variant),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Int(value) | Self::Timestamp(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}
