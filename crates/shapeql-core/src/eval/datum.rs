use crate::value::Value;
use std::collections::BTreeMap;

///
/// Datum
///
/// In-memory row data. `Null` doubles as the absent object: a relation
/// member holding `Null` means the related row does not exist.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Datum {
    Null,
    Value(Value),
    Record(BTreeMap<String, Self>),
    List(Vec<Self>),
}

impl Datum {
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::from(value.into())
    }

    /// Build a record from `(member, datum)` pairs.
    #[must_use]
    pub fn record<K: Into<String>>(members: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Record(
            members
                .into_iter()
                .map(|(name, datum)| (name.into(), datum))
                .collect(),
        )
    }

    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Self>) -> Self {
        Self::List(items.into_iter().collect())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Member of a record; `None` for anything that is not a record or
    /// lacks the member.
    #[must_use]
    pub fn get(&self, member: &str) -> Option<&Self> {
        match self {
            Self::Record(members) => members.get(member),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            other => Self::Value(other),
        }
    }
}

///
/// Dataset
///
/// Root rows per entity, the evaluator's stand-in for a backend.
///

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    entities: BTreeMap<String, Vec<Datum>>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rows(
        mut self,
        entity: impl Into<String>,
        rows: impl IntoIterator<Item = Datum>,
    ) -> Self {
        self.entities
            .entry(entity.into())
            .or_default()
            .extend(rows);
        self
    }

    #[must_use]
    pub fn rows(&self, entity: &str) -> Option<&[Datum]> {
        self.entities.get(entity).map(Vec::as_slice)
    }
}
