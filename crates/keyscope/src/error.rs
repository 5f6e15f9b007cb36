//! Error types for shortcut operations

use thiserror::Error;

/// Errors that can occur while parsing a declared key or chord
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("Empty key declaration")]
    Empty,

    #[error("Empty step in chord: {0}")]
    EmptyStep(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Modifier without key: {0}")]
    MissingKey(String),
}

/// Errors that can occur in the scope registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Scope already registered: {0}")]
    DuplicateScope(u64),
}

/// Errors that can occur while loading declarative shortcut configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JSON syntax: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid YAML syntax: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}
