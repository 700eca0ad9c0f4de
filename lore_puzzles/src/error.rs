//! Error types for configuration and puzzle content.

use thiserror::Error;

/// Errors raised while loading [`PuzzleConfig`](crate::PuzzleConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read puzzle config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse puzzle config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors raised when content cannot support a session.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to parse content bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("pool '{pool}' needs at least {needed} entries but has {available}")]
    PoolTooSmall {
        pool: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("invalid grid layout: {0}")]
    Layout(String),
    #[error("agent {agent} has an empty route")]
    EmptyRoute { agent: usize },
    #[error("cipher plaintext contains no words")]
    EmptyText,
}
