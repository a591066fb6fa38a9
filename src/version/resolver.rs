//! Compatible version resolution
//!
//! Given a parsed [`PatchManifest`], collects every version any patch
//! declares compatible with a package and picks the "latest" one.

use std::collections::HashSet;

use crate::version::manifest::PatchManifest;
use crate::version::natural::sort_natural;

/// Collect the versions of `package_id` that any patch in the manifest is
/// compatible with.
///
/// The result is deduplicated and sorted in natural order, lowest first.
/// A package that no patch mentions yields an empty list.
pub fn resolve_compatible_versions(manifest: &PatchManifest, package_id: &str) -> Vec<String> {
    let union: HashSet<&str> = manifest
        .descriptors()
        .iter()
        .filter_map(|descriptor| descriptor.versions_for(package_id))
        .flatten()
        .map(String::as_str)
        .collect();

    let mut versions: Vec<String> = union.into_iter().map(String::from).collect();
    sort_natural(&mut versions);
    versions
}

/// Natural-order maximum of [`resolve_compatible_versions`], if any.
pub fn latest_compatible_version(manifest: &PatchManifest, package_id: &str) -> Option<String> {
    resolve_compatible_versions(manifest, package_id).pop()
}

/// Strategy for choosing the "latest" compatible version
///
/// Manifest producers have disagreed on what "latest" means:
/// - Natural: the natural-order maximum of all compatible versions (default)
/// - Manifest order: the version listed last, for producers that append
///   newer releases to the end of each list
pub trait LatestVersionResolver: Send + Sync {
    /// Determine the latest compatible version of `package_id`
    ///
    /// Default implementation returns the natural-order maximum.
    fn resolve_latest(&self, manifest: &PatchManifest, package_id: &str) -> Option<String> {
        latest_compatible_version(manifest, package_id)
    }
}
