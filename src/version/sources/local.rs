//! Manifest stored on local disk

use std::path::PathBuf;

use tracing::debug;

use crate::version::error::ManifestError;
use crate::version::manifest::PatchManifest;
use crate::version::source::ManifestSource;

pub struct LocalManifestSource {
    path: PathBuf,
}

impl LocalManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ManifestSource for LocalManifestSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<PatchManifest, ManifestError> {
        debug!("Reading manifest from {}", self.path.display());
        let content = tokio::fs::read(&self.path).await?;
        PatchManifest::from_slice(&content)
    }
}
