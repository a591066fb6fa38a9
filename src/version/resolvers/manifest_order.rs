//! Manifest-order latest version resolver

use crate::version::manifest::PatchManifest;
use crate::version::resolver::LatestVersionResolver;

/// Picks the version listed last in the manifest.
///
/// Walks descriptors from the end and returns the last version of the first
/// one that lists any version for the package. Matches producers that append
/// newly supported versions rather than keeping lists sorted.
pub struct ManifestOrderLatestResolver;

impl LatestVersionResolver for ManifestOrderLatestResolver {
    fn resolve_latest(&self, manifest: &PatchManifest, package_id: &str) -> Option<String> {
        manifest
            .descriptors()
            .iter()
            .rev()
            .filter_map(|descriptor| descriptor.versions_for(package_id))
            .find_map(|versions| versions.last())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::manifest::PatchDescriptor;

    #[test]
    fn returns_last_listed_version() {
        let manifest = PatchManifest::new(vec![
            PatchDescriptor::default().with_versions("com.app.a", ["2.0", "3.0"]),
            PatchDescriptor::default().with_versions("com.app.a", ["1.5", "1.4"]),
        ]);

        assert_eq!(
            ManifestOrderLatestResolver.resolve_latest(&manifest, "com.app.a"),
            Some("1.4".to_string())
        );
    }

    #[test]
    fn skips_trailing_descriptors_without_versions() {
        let manifest = PatchManifest::new(vec![
            PatchDescriptor::default().with_versions("com.app.a", ["2.0"]),
            PatchDescriptor::default().with_versions("com.app.a", Vec::<String>::new()),
            PatchDescriptor::default().with_versions("com.app.b", ["9.0"]),
        ]);

        assert_eq!(
            ManifestOrderLatestResolver.resolve_latest(&manifest, "com.app.a"),
            Some("2.0".to_string())
        );
    }

    #[test]
    fn returns_none_for_unknown_package() {
        let manifest = PatchManifest::new(vec![
            PatchDescriptor::default().with_versions("com.app.a", ["2.0"]),
        ]);

        assert_eq!(
            ManifestOrderLatestResolver.resolve_latest(&manifest, "com.app.z"),
            None
        );
    }
}
