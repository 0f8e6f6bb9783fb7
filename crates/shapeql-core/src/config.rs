use serde::{Deserialize, Serialize};
use std::{io, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read compiler config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid compiler config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// CompileConfig
///
/// Compiler knobs. Every field has a default, so an empty TOML document is
/// a valid configuration.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// Maximum number of relation steps in any shape or predicate path.
    pub max_depth: usize,

    /// Carry members needed only by filters and guards as shadow members.
    pub shadow_members: bool,

    /// Collapse single-child connectives and drop constant-true root filters.
    pub fold_constants: bool,
}

impl CompileConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub const fn with_shadow_members(mut self, shadow_members: bool) -> Self {
        self.shadow_members = shadow_members;
        self
    }

    #[must_use]
    pub const fn with_fold_constants(mut self, fold_constants: bool) -> Self {
        self.fold_constants = fold_constants;
        self
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            shadow_members: true,
            fold_constants: true,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CompileConfig::from_toml_str("").expect("empty config");

        assert_eq!(config, CompileConfig::default());
        assert_eq!(config.max_depth, 32);
        assert!(config.shadow_members);
        assert!(config.fold_constants);
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let config = CompileConfig::from_toml_str("max_depth = 4\nshadow_members = false\n")
            .expect("partial config");

        assert_eq!(config.max_depth, 4);
        assert!(!config.shadow_members);
        assert!(config.fold_constants);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = CompileConfig::from_toml_str("max_dpeth = 4\n").expect_err("typo");

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = CompileConfig::from_path("/nonexistent/shapeql.toml").expect_err("missing");

        assert!(matches!(err, ConfigError::Io { ref path, .. } if path.contains("shapeql.toml")));
    }
}
