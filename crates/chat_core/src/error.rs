//! Error types for rule loading and configuration

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Keyword pattern is empty")]
    EmptyPattern,

    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Rule has no enabled keywords")]
    NoKeywords,

    #[error("Reply text is empty")]
    EmptyReply,

    #[error("Rule '{id}': {source}")]
    InRule {
        id: String,
        #[source]
        source: Box<RuleError>,
    },

    #[error("Duplicate rule id: {0}")]
    DuplicateId(String),

    #[error("Fallback reply is empty")]
    EmptyFallback,

    #[error("Failed to parse TOML rules: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON rules: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported rules file extension: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuleError {
    pub(crate) fn in_rule(id: &str, source: RuleError) -> Self {
        RuleError::InRule {
            id: id.to_string(),
            source: Box::new(source),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
