//! Download orchestration through the `apkmd` download helper

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::{AppConfig, VersionRequest, Workspace};
use crate::pipeline::{PipelineError, ensure_success};
use crate::process::CommandRunner;
use crate::version::resolver::LatestVersionResolver;
use crate::version::source::ManifestSource;

/// Config file consumed by `apkmd download --config`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApkmdConfig {
    pub options: ApkmdOptions,
    pub apps: Vec<ApkmdApp>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApkmdOptions {
    pub arch: String,
    pub out_dir: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApkmdApp {
    pub org: String,
    pub repo: String,
    pub version: String,
    pub out_file: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutcome {
    /// Version handed to the download helper
    pub version: String,
    /// Generated `apkmd` config file
    pub config_path: PathBuf,
    pub stdout: String,
}

/// Build the `apkmd` config for a single app
pub fn generate_apkmd_config(app: &AppConfig, version: &str, out_dir: &Path) -> ApkmdConfig {
    ApkmdConfig {
        options: ApkmdOptions {
            arch: app.build.arch.clone(),
            out_dir: out_dir.display().to_string(),
            kind: app.source.kind.as_str().to_string(),
        },
        apps: vec![ApkmdApp {
            org: app.source.org.clone(),
            repo: app.source.repo.clone(),
            version: version.to_string(),
            out_file: app.package.clone(),
        }],
    }
}

/// Arguments for `apkmd`
pub fn apkmd_args(config_path: &Path, debug: bool) -> Vec<String> {
    let mut args = vec![
        "download".to_string(),
        "--config".to_string(),
        config_path.display().to_string(),
    ];
    if debug {
        args.push("--debug".to_string());
    }
    args
}

/// Turn the app's `version` setting into a concrete version string.
///
/// `auto` loads the patch manifest and asks `resolver` for the latest
/// compatible version; an empty result is [`PipelineError::NoCompatibleVersion`].
/// Any other value is passed through to the download helper unchanged.
pub async fn resolve_app_version(
    app: &AppConfig,
    manifest_source: Option<&dyn ManifestSource>,
    resolver: &dyn LatestVersionResolver,
) -> Result<String, PipelineError> {
    match app.version_request() {
        VersionRequest::Auto => {
            let source = manifest_source.ok_or(PipelineError::ManifestNotConfigured)?;
            let manifest = source.load().await?;
            info!(
                "Loaded {} patch descriptors from {}",
                manifest.len(),
                source.describe()
            );

            let version = resolver
                .resolve_latest(&manifest, &app.package)
                .ok_or_else(|| PipelineError::NoCompatibleVersion(app.package.clone()))?;
            info!("Latest compatible version of {}: {}", app.package, version);
            Ok(version)
        }
        VersionRequest::Latest => Ok("latest".to_string()),
        VersionRequest::Exact(version) => Ok(version),
    }
}

/// Write the `apkmd` config for `app_name` and run the download.
pub async fn download_apk<R: CommandRunner + ?Sized>(
    workspace: &Workspace,
    runner: &R,
    app_name: &str,
    app: &AppConfig,
    version: &str,
    debug: bool,
) -> Result<DownloadOutcome, PipelineError> {
    let out_dir = workspace.download_dir();
    tokio::fs::create_dir_all(&out_dir)
        .await
        .map_err(|e| PipelineError::io(&out_dir, e))?;

    let config = generate_apkmd_config(app, version, &out_dir);
    let config_path = out_dir.join(format!("{}.json", app_name));
    let content = serde_json::to_string_pretty(&config)?;
    tokio::fs::write(&config_path, content)
        .await
        .map_err(|e| PipelineError::io(&config_path, e))?;

    info!("Downloading {} {} ({})", app.package, version, app.build.arch);
    let result = runner
        .run(&workspace.tools.apkmd, &apkmd_args(&config_path, debug))
        .await?;
    let result = ensure_success("apkmd", result)?;
    info!("Download of {} completed", app_name);

    Ok(DownloadOutcome {
        version: version.to_string(),
        config_path,
        stdout: result.stdout,
    })
}
