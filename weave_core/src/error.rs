//! Fatal errors of the weaver: configuration and collaborator failures.

use thiserror::Error;

use crate::story::StoryError;

#[derive(Error, Debug)]
pub enum WeaverError {
    #[error("a world model is required to build a quest weaver")]
    MissingWorldModel,

    #[error("invalid configuration file: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("story error: {0}")]
    Story(#[from] StoryError),
}
