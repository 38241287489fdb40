//! Compiler limits and defaults, loadable from TOML.

use crate::db::order::NullsOrder;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

///
/// FilterConfig
///
/// Limits applied while compiling filters and windows. Every limit must be
/// non-zero; `nulls` is the null placement for ascending order fields that
/// do not name one, mirrored for descending.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub max_depth: usize,
    pub max_list_literal_len: usize,
    pub max_take: u64,
    pub nulls: NullsOrder,
}

impl FilterConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 32;
    pub const DEFAULT_MAX_LIST_LITERAL_LEN: usize = 1024;
    pub const DEFAULT_MAX_TAKE: u64 = 10_000;

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |field: &'static str| ConfigError::Invalid {
            field,
            message: "must be greater than zero".to_string(),
        };

        if self.max_depth == 0 {
            return Err(zero("max_depth"));
        }
        if self.max_list_literal_len == 0 {
            return Err(zero("max_list_literal_len"));
        }
        if self.max_take == 0 {
            return Err(zero("max_take"));
        }

        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_list_literal_len: Self::DEFAULT_MAX_LIST_LITERAL_LEN,
            max_take: Self::DEFAULT_MAX_TAKE,
            nulls: NullsOrder::First,
        }
    }
}

///
/// TESTS
///
