//! Error types shared by the settings store and the timer engine

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by plugin operations
#[derive(Error, Debug)]
pub enum PluginError {
    /// Reading or writing the settings file failed
    #[error("Settings I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file or a settings value is not valid JSON
    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A shared state mutex was poisoned
    #[error("Failed to lock {0}")]
    Lock(&'static str),
}

impl PluginError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
