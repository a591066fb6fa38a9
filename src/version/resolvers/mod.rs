//! Latest version strategies

mod manifest_order;
mod natural;

pub use manifest_order::ManifestOrderLatestResolver;
pub use natural::NaturalLatestResolver;

use crate::config::LatestStrategy;
use crate::version::resolver::LatestVersionResolver;

/// Build the resolver for a configured strategy
pub fn resolver_for(strategy: LatestStrategy) -> Box<dyn LatestVersionResolver> {
    match strategy {
        LatestStrategy::Natural => Box::new(NaturalLatestResolver),
        LatestStrategy::ManifestOrder => Box::new(ManifestOrderLatestResolver),
    }
}
