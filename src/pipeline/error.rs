use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::process::ProcessError;
use crate::version::error::ManifestError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode download config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{tool} exited with code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("No compatible version of {0} found in the patch manifest")]
    NoCompatibleVersion(String),

    #[error("App version is 'auto' but no patch manifest is configured")]
    ManifestNotConfigured,
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
