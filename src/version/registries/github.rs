//! GitHub Releases API registry implementation

use crate::config::USER_AGENT;
use crate::version::error::RegistryError;
use crate::version::registries::check_status;
use crate::version::registry::PatchRegistry;
use serde::Deserialize;
use tracing::warn;

/// Default base URL for GitHub API
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Response from GitHub Releases API
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// Registry implementation for GitHub Releases API
pub struct GitHubReleaseRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubReleaseRegistry {
    /// Creates a new GitHubReleaseRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for GitHubReleaseRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl PatchRegistry for GitHubReleaseRegistry {
    async fn latest_release(&self, repository: &str) -> Result<String, RegistryError> {
        let url = format!("{}/repos/{}/releases/latest", self.base_url, repository);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let response = check_status("GitHub API", repository, response)?;

        let release: Release = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub release response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(release.tag_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn latest_release_returns_tag_name() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/revanced/revanced-patches/releases/latest")
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tag_name": "v5.2.1", "published_at": "2025-01-15T00:00:00Z"}"#)
            .create_async()
            .await;

        let registry = GitHubReleaseRegistry::new(&server.url());
        let result = registry
            .latest_release("revanced/revanced-patches")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, "v5.2.1");
    }

    #[tokio::test]
    async fn latest_release_returns_not_found_for_repo_without_releases() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/some/repo/releases/latest")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let registry = GitHubReleaseRegistry::new(&server.url());
        let result = registry.latest_release("some/repo").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn latest_release_returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/revanced/revanced-patches/releases/latest")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_header("retry-after", "60")
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let registry = GitHubReleaseRegistry::new(&server.url());
        let result = registry.latest_release("revanced/revanced-patches").await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(RegistryError::RateLimited {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn latest_release_returns_invalid_response_for_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/revanced/revanced-patches/releases/latest")
            .with_status(502)
            .create_async()
            .await;

        let registry = GitHubReleaseRegistry::new(&server.url());
        let result = registry.latest_release("revanced/revanced-patches").await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(RegistryError::InvalidResponse(message)) if message.contains("502")
        ));
    }
}
