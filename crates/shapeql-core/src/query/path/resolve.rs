use crate::{
    error::CompileError,
    model::{EntityModel, MemberKind, SchemaModel},
    query::path::{RelationPath, RelationStep, ResolvedPath, ScalarMember, Terminal},
};

///
/// ResolvedMember
///
/// One resolved segment: either a scalar of the current entity or a
/// relation step out of it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ResolvedMember {
    Scalar(ScalarMember),
    Relation(RelationStep),
}

///
/// PathResolver
///
/// Purely structural resolution of member references against relation
/// metadata. No data access; the schema is only borrowed.
///

#[derive(Clone, Copy, Debug)]
pub struct PathResolver<'a> {
    schema: &'a SchemaModel,
    max_depth: usize,
}

impl<'a> PathResolver<'a> {
    #[must_use]
    pub const fn new(schema: &'a SchemaModel, max_depth: usize) -> Self {
        Self { schema, max_depth }
    }

    pub fn entity(&self, name: &str) -> Result<&'a EntityModel, CompileError> {
        self.schema
            .entity(name)
            .ok_or_else(|| CompileError::UnknownEntity {
                entity: name.to_string(),
            })
    }

    /// Resolve a dotted reference anchored at `entity`.
    pub fn resolve(&self, entity: &str, reference: &str) -> Result<ResolvedPath, CompileError> {
        self.resolve_in(entity, "", 0, reference)
    }

    /// Resolve a dotted reference anchored at `entity`, which itself sits
    /// `depth` relations below the root under the dotted `prefix`.
    pub(crate) fn resolve_in(
        &self,
        entity: &str,
        prefix: &str,
        depth: usize,
        reference: &str,
    ) -> Result<ResolvedPath, CompileError> {
        let display = qualify(prefix, reference);
        let mut current = self.entity(entity)?;
        let mut path = RelationPath::new();
        let mut scalar = None;

        for segment in reference.split('.') {
            if scalar.is_some() {
                return Err(CompileError::InvalidPathThroughScalar { path: display });
            }

            let walked = qualify(&qualify(prefix, &path.dotted()), segment);
            match self.member(current, &walked, segment)? {
                ResolvedMember::Scalar(member) => scalar = Some(member),
                ResolvedMember::Relation(step) => {
                    if depth + path.len() + 1 > self.max_depth {
                        return Err(CompileError::DepthLimitExceeded {
                            path: display,
                            limit: self.max_depth,
                        });
                    }
                    current = self.entity(&step.target)?;
                    path.push(step);
                }
            }
        }

        let terminal = scalar.map_or(Terminal::Relation, Terminal::Scalar);

        Ok(ResolvedPath {
            path,
            terminal,
            display,
        })
    }

    /// Resolve a single member of `entity`; `display` names it in errors.
    pub(crate) fn member(
        &self,
        entity: &EntityModel,
        display: &str,
        name: &str,
    ) -> Result<ResolvedMember, CompileError> {
        let member = entity
            .member_named(name)
            .ok_or_else(|| CompileError::UnknownMember {
                path: display.to_string(),
            })?;

        match &member.kind {
            MemberKind::Scalar { ty, nullable } => Ok(ResolvedMember::Scalar(ScalarMember {
                name: member.name.clone(),
                ty: *ty,
                nullable: *nullable,
            })),
            MemberKind::Relation {
                target,
                cardinality,
                optional,
                probe,
            } => {
                let target_model = self.entity(target)?;
                let probe = probe
                    .as_deref()
                    .or(target_model.key.as_deref())
                    .filter(|probe| {
                        target_model
                            .member_named(probe)
                            .is_some_and(|member| member.is_probe_capable())
                    })
                    .map(str::to_string);

                let step = RelationStep {
                    member: member.name.clone(),
                    source: entity.name.clone(),
                    target: target.clone(),
                    cardinality: *cardinality,
                    optional: *optional,
                    probe,
                };

                // Fail closed: presence of an optional relation is only ever
                // decided by its probe.
                if step.needs_guard() && step.probe.is_none() {
                    return Err(CompileError::MissingProbeMember {
                        path: display.to_string(),
                    });
                }

                Ok(ResolvedMember::Relation(step))
            }
        }
    }
}

// Join a dotted prefix and a suffix, skipping empty parts.
pub(crate) fn qualify(prefix: &str, suffix: &str) -> String {
    match (prefix.is_empty(), suffix.is_empty()) {
        (true, _) => suffix.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}.{suffix}"),
    }
}
