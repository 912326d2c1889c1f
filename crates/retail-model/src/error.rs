use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading rules or pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("built-in cleaning rules are invalid: {0}")]
    Builtin(#[source] toml::de::Error),

    #[error("invalid cleaning rules: {message}")]
    InvalidRules { message: String },

    #[error("invalid pipeline configuration: {message}")]
    InvalidPipeline { message: String },

    #[error("unknown domain '{0}'")]
    UnknownDomain(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Toml {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
