//! Registry test utilities

use std::collections::HashMap;

use async_trait::async_trait;

use apk_patchkit::version::error::RegistryError;
use apk_patchkit::version::registry::{ApkRegistry, PatchRegistry};

/// APK registry answering from a fixed repo -> version table
#[derive(Default)]
pub struct StaticApkRegistry {
    versions: HashMap<String, String>,
}

impl StaticApkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, repo: &str, version: &str) -> Self {
        self.versions.insert(repo.to_string(), version.to_string());
        self
    }
}

#[async_trait]
impl ApkRegistry for StaticApkRegistry {
    async fn latest_version(&self, _org: &str, repo: &str) -> Result<String, RegistryError> {
        self.versions
            .get(repo)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(repo.to_string()))
    }
}

/// Patch registry answering from a fixed repository -> tag table
#[derive(Default)]
pub struct StaticPatchRegistry {
    releases: HashMap<String, String>,
}

impl StaticPatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_release(mut self, repository: &str, tag: &str) -> Self {
        self.releases
            .insert(repository.to_string(), tag.to_string());
        self
    }
}

#[async_trait]
impl PatchRegistry for StaticPatchRegistry {
    async fn latest_release(&self, repository: &str) -> Result<String, RegistryError> {
        self.releases
            .get(repository)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(repository.to_string()))
    }
}
