use crate::model::{entity::EntityModel, member::MemberKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// SchemaModel
///
/// Read-only, process-wide relation metadata for every entity type.
/// Built once before any request is served; compilation only borrows it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "Vec<EntityModel>", into = "Vec<EntityModel>")]
pub struct SchemaModel {
    entities: BTreeMap<String, EntityModel>,
}

impl SchemaModel {
    /// Build a schema, validating structural contracts up front.
    ///
    /// Probe usability is deliberately not checked here: a relation without
    /// a usable probe is legal metadata and only fails compilation when a
    /// request traverses it as an optional relation.
    pub fn new(entities: impl IntoIterator<Item = EntityModel>) -> Result<Self, SchemaError> {
        let mut by_name = BTreeMap::new();
        for entity in entities {
            let mut seen = BTreeSet::new();
            for member in &entity.members {
                if !seen.insert(member.name.as_str()) {
                    return Err(SchemaError::DuplicateMember {
                        entity: entity.name.clone(),
                        member: member.name.clone(),
                    });
                }
            }

            if let Some(key) = &entity.key
                && !entity
                    .member_named(key)
                    .is_some_and(|member| member.is_probe_capable())
            {
                return Err(SchemaError::InvalidKey {
                    entity: entity.name.clone(),
                    key: key.clone(),
                });
            }

            if by_name.contains_key(&entity.name) {
                return Err(SchemaError::DuplicateEntity {
                    entity: entity.name,
                });
            }
            by_name.insert(entity.name.clone(), entity);
        }

        for entity in by_name.values() {
            for member in &entity.members {
                if let MemberKind::Relation { target, .. } = &member.kind
                    && !by_name.contains_key(target)
                {
                    return Err(SchemaError::UnknownTarget {
                        entity: entity.name.clone(),
                        member: member.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        Ok(Self { entities: by_name })
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&EntityModel> {
        self.entities.get(name)
    }
}

impl TryFrom<Vec<EntityModel>> for SchemaModel {
    type Error = SchemaError;

    fn try_from(entities: Vec<EntityModel>) -> Result<Self, Self::Error> {
        Self::new(entities)
    }
}

impl From<SchemaModel> for Vec<EntityModel> {
    fn from(schema: SchemaModel) -> Self {
        schema.entities.into_values().collect()
    }
}

///
/// SchemaError
///
/// Structural violations in externally supplied relation metadata.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaError {
    #[error("duplicate entity '{entity}'")]
    DuplicateEntity { entity: String },

    #[error("entity '{entity}' declares member '{member}' more than once")]
    DuplicateMember { entity: String, member: String },

    #[error("entity '{entity}' key '{key}' is not a non-nullable scalar member")]
    InvalidKey { entity: String, key: String },

    #[error("relation '{entity}.{member}' targets unknown entity '{target}'")]
    UnknownTarget {
        entity: String,
        member: String,
        target: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{SchemaError, SchemaModel};
    use crate::{model::EntityModel, value::ScalarType};

    #[test]
    fn rejects_dangling_relation_target() {
        let err = SchemaModel::new([EntityModel::new("Bar")
            .key("id", ScalarType::Int)
            .optional("foo", "Foo")])
        .expect_err("Foo is not registered");

        assert_eq!(
            err,
            SchemaError::UnknownTarget {
                entity: "Bar".into(),
                member: "foo".into(),
                target: "Foo".into(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_members() {
        let err = SchemaModel::new([EntityModel::new("Foo")
            .key("id", ScalarType::Int)
            .scalar("id", ScalarType::Int)])
        .expect_err("id declared twice");

        assert!(matches!(err, SchemaError::DuplicateMember { .. }));
    }

    #[test]
    fn rejects_nullable_key() {
        let mut entity = EntityModel::new("Foo").nullable("id", ScalarType::Int);
        entity.key = Some("id".into());

        let err = SchemaModel::new([entity]).expect_err("nullable key");
        assert!(matches!(err, SchemaError::InvalidKey { .. }));
    }

    #[test]
    fn round_trips_through_json_metadata() {
        let json = r#"[
            {"name": "Foo", "key": "id", "members": [
                {"name": "id", "kind": "scalar", "ty": "int"},
                {"name": "barString", "kind": "scalar", "ty": "text", "nullable": true}
            ]},
            {"name": "Bar", "key": "id", "members": [
                {"name": "id", "kind": "scalar", "ty": "int"},
                {"name": "foo", "kind": "relation", "target": "Foo",
                 "cardinality": "single", "optional": true}
            ]}
        ]"#;

        let schema: SchemaModel = serde_json::from_str(json).expect("valid metadata");
        let bar = schema.entity("Bar").expect("Bar registered");
        assert!(bar.member_named("foo").is_some_and(|m| m.is_relation()));
        assert_eq!(
            schema
                .entity("Foo")
                .and_then(|foo| foo.member_named("barString"))
                .and_then(|m| m.scalar()),
            Some((ScalarType::Text, true))
        );
    }
}
