//! APKMirror app API registry implementation

use crate::config::USER_AGENT;
use crate::version::error::RegistryError;
use crate::version::registries::check_status;
use crate::version::registry::ApkRegistry;
use serde::Deserialize;
use tracing::warn;

/// Default base URL for the APKMirror API
pub const DEFAULT_BASE_URL: &str = "https://api.apkmirror.com";

/// Response from the APKMirror app endpoint
#[derive(Debug, Deserialize)]
struct AppResponse {
    data: AppData,
}

#[derive(Debug, Deserialize)]
struct AppData {
    version: String,
}

/// Registry implementation for the APKMirror API
pub struct ApkMirrorRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl ApkMirrorRegistry {
    /// Creates a new ApkMirrorRegistry with a custom base URL
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

impl Default for ApkMirrorRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl ApkRegistry for ApkMirrorRegistry {
    async fn latest_version(&self, org: &str, repo: &str) -> Result<String, RegistryError> {
        let url = format!("{}/v2/apps/{}/{}/", self.base_url, org, repo);

        let response = self.client.get(&url).send().await?;
        let response = check_status("APKMirror API", &format!("{}/{}", org, repo), response)?;

        let app: AppResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse APKMirror response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        Ok(app.data.version)
    }
}
