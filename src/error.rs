//! Error type for the game core.
//!
//! Very little here is fatal: per-frame failures degrade to "skip the effect
//! and keep playing".  What does surface as an error is startup
//! configuration and the few checks callers may want to log.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::scenes::SceneId;

#[derive(Error, Debug)]
pub enum GameError {
    /// The config file exists but could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid TOML for [`crate::config::GameConfig`].
    #[error("failed to parse config '{}': {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A config value is outside its usable range.
    #[error("invalid config value for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The audio backend refused to start; the game runs silent.
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),

    /// A scene asked for a transition its state does not own.
    #[error("illegal scene transition from {from:?} to {to:?}")]
    IllegalTransition { from: SceneId, to: SceneId },
}

pub type GameResult<T> = Result<T, GameError>;
