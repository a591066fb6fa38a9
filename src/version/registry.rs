//! Registry traits for checking upstream releases

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;

/// Trait for looking up the newest published build of an application
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ApkRegistry: Send + Sync {
    /// Fetches the latest version of an app
    ///
    /// # Arguments
    /// * `org` - Publisher slug (e.g., "google-inc")
    /// * `repo` - App slug (e.g., "youtube")
    async fn latest_version(&self, org: &str, repo: &str) -> Result<String, RegistryError>;
}

/// Trait for looking up the newest release of a patch bundle
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PatchRegistry: Send + Sync {
    /// Fetches the latest release tag of a patch repository
    ///
    /// # Arguments
    /// * `repository` - Repository in "owner/name" form (e.g., "revanced/revanced-patches")
    async fn latest_release(&self, repository: &str) -> Result<String, RegistryError>;
}
