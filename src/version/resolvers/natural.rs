//! Natural-order latest version resolver

use crate::version::resolver::LatestVersionResolver;

/// Picks the natural-order maximum of every compatible version.
pub struct NaturalLatestResolver;

impl LatestVersionResolver for NaturalLatestResolver {
    // Uses default implementation
}
