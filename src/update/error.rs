use thiserror::Error;

use crate::version::error::RegistryError;

#[derive(Debug, Error)]
pub enum LockfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("APK version lookup failed: {0}")]
    ApkRegistry(#[source] RegistryError),

    #[error("Patch release lookup failed: {0}")]
    PatchRegistry(#[source] RegistryError),
}
