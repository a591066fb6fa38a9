//! Manifest fetched over HTTP

use tracing::{debug, warn};

use crate::config::USER_AGENT;
use crate::version::error::ManifestError;
use crate::version::manifest::PatchManifest;
use crate::version::source::ManifestSource;

pub struct RemoteManifestSource {
    client: reqwest::Client,
    url: String,
}

impl RemoteManifestSource {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
            url: url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ManifestSource for RemoteManifestSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn load(&self) -> Result<PatchManifest, ManifestError> {
        debug!("Fetching manifest from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ManifestError::NotFound(self.url.clone()));
        }

        if !status.is_success() {
            warn!("Manifest host returned status {}: {}", status, self.url);
            return Err(ManifestError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body = response.bytes().await?;
        PatchManifest::from_slice(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::resolver::latest_compatible_version;
    use mockito::Server;

    #[tokio::test]
    async fn load_fetches_and_parses_manifest() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/patches.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"name": "Hide ads", "compatiblePackages": {"com.app.a": ["1.9.0", "1.10.0"]}},
                    {"name": "Theme", "compatiblePackages": [{"name": "com.app.a", "versions": ["1.2.0"]}]}
                ]"#,
            )
            .create_async()
            .await;

        let source = RemoteManifestSource::new(&format!("{}/patches.json", server.url()));
        let manifest = source.load().await.unwrap();

        mock.assert_async().await;
        assert_eq!(manifest.len(), 2);
        assert_eq!(
            latest_compatible_version(&manifest, "com.app.a"),
            Some("1.10.0".to_string())
        );
    }

    #[tokio::test]
    async fn load_returns_not_found_for_404() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/patches.json")
            .with_status(404)
            .create_async()
            .await;

        let source = RemoteManifestSource::new(&format!("{}/patches.json", server.url()));
        let result = source.load().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ManifestError::NotFound(_))));
    }

    #[tokio::test]
    async fn load_returns_invalid_response_for_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/patches.json")
            .with_status(500)
            .create_async()
            .await;

        let source = RemoteManifestSource::new(&format!("{}/patches.json", server.url()));
        let result = source.load().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ManifestError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn load_returns_data_format_error_for_non_array_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/patches.json")
            .with_status(200)
            .with_body(r#"{"message": "rate limited"}"#)
            .create_async()
            .await;

        let source = RemoteManifestSource::new(&format!("{}/patches.json", server.url()));
        let result = source.load().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ManifestError::DataFormat(_))));
    }
}
