//! Registry implementations for upstream release checks

pub mod apkmirror;
pub mod github;

pub use apkmirror::ApkMirrorRegistry;
pub use github::GitHubReleaseRegistry;

use reqwest::{Response, StatusCode};
use tracing::warn;

use crate::version::error::RegistryError;

/// Map a non-success upstream response onto [`RegistryError`].
///
/// 404 is `NotFound(subject)`, 429 is `RateLimited` with the `retry-after`
/// seconds when present, any other non-2xx is `InvalidResponse`.
pub(crate) fn check_status(
    api: &str,
    subject: &str,
    response: Response,
) -> Result<Response, RegistryError> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(RegistryError::NotFound(subject.to_string()));
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(RegistryError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    if !status.is_success() {
        warn!("{} returned status {}: {}", api, status, response.url());
        return Err(RegistryError::InvalidResponse(format!(
            "Unexpected status: {}",
            status
        )));
    }

    Ok(response)
}
