//! Manifest source trait for loading patch manifests

#[cfg(test)]
use mockall::automock;

use crate::version::error::ManifestError;
use crate::version::manifest::PatchManifest;

/// Trait for loading a patch manifest from local disk or the network
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ManifestSource: Send + Sync {
    /// Human-readable location, used in log lines
    fn describe(&self) -> String;

    /// Load and parse the manifest
    ///
    /// # Returns
    /// * `Ok(PatchManifest)` - Parsed manifest; malformed descriptors are kept empty
    /// * `Err(ManifestError)` - If the document can't be read or isn't a JSON array
    async fn load(&self) -> Result<PatchManifest, ManifestError>;
}
