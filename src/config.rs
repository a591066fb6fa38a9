use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::version::registries::{apkmirror, github};
use crate::version::source::ManifestSource;
use crate::version::sources::{LocalManifestSource, RemoteManifestSource};

// =============================================================================
// Constants
// =============================================================================

/// User agent sent with every HTTP request
pub const USER_AGENT: &str = "apk-patchkit";

/// Tool configuration file looked up in the workspace root
pub const DEFAULT_CONFIG_FILE: &str = "patchkit.yaml";

/// Delay between starting each upstream check to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("No configuration for app '{0}'")]
    UnknownApp(String),
}

/// Tool locations and workspace layout (`patchkit.yaml`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolsConfig {
    pub java: String,
    pub apkmd: String,
    pub apk_editor_jar: PathBuf,
    pub patcher_jar: PathBuf,
    pub patch_bundle: PathBuf,
    pub patch_options: PathBuf,
    pub download_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub apps_dir: PathBuf,
    pub build_rules: PathBuf,
    pub applications: PathBuf,
    pub lockfile: PathBuf,
    pub manifest: ManifestConfig,
    pub resolver: ResolverConfig,
    pub apkmirror_base_url: String,
    pub github_base_url: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            apkmd: "apkmd".to_string(),
            apk_editor_jar: PathBuf::from("APKEditor.jar"),
            patcher_jar: PathBuf::from("revanced-cli-all.jar"),
            patch_bundle: PathBuf::from("patches.rvp"),
            patch_options: PathBuf::from("options.json"),
            download_dir: PathBuf::from("downloads"),
            dist_dir: PathBuf::from("dist"),
            apps_dir: PathBuf::from("configs/apps"),
            build_rules: PathBuf::from("configs/build_rules.yaml"),
            applications: PathBuf::from("configs/applications.yaml"),
            lockfile: PathBuf::from("versions.lock"),
            manifest: ManifestConfig::default(),
            resolver: ResolverConfig::default(),
            apkmirror_base_url: apkmirror::DEFAULT_BASE_URL.to_string(),
            github_base_url: github::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Where the patch manifest lives; `url` wins when both are set
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ManifestConfig {
    pub url: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    pub latest: LatestStrategy,
}

/// How "latest compatible version" is chosen
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LatestStrategy {
    /// Natural-order maximum of all compatible versions
    #[default]
    Natural,
    /// Version listed last in the manifest
    ManifestOrder,
}

/// Per-app configuration (`configs/apps/<app>.yaml`, `configs/applications.yaml`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Android package id (e.g., "com.google.android.youtube")
    pub package: String,
    /// "auto", "latest" or an exact version
    #[serde(default = "default_app_version")]
    pub version: String,
    pub source: SourceConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub patches: PatchesConfig,
    #[serde(default)]
    pub root_install: RootInstallConfig,
}

fn default_app_version() -> String {
    "latest".to_string()
}

/// What the `version` field of an app asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequest {
    /// Newest version the patch manifest declares compatible
    Auto,
    /// Newest upstream release, resolved by the download helper
    Latest,
    Exact(String),
}

impl AppConfig {
    pub fn version_request(&self) -> VersionRequest {
        match self.version.trim() {
            "auto" | "compatible" => VersionRequest::Auto,
            "" | "latest" => VersionRequest::Latest,
            exact => VersionRequest::Exact(exact.to_string()),
        }
    }
}

/// Download source of an app
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SourceConfig {
    pub org: String,
    pub repo: String,
    #[serde(default, rename = "type")]
    pub kind: SourceKind,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Apk,
    Bundle,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Apk => "apk",
            SourceKind::Bundle => "bundle",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuildConfig {
    pub arch: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            arch: "arm64-v8a".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PatchesConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// GitHub "owner/name" of the patch repository
    pub source: Option<String>,
    /// Patch release the app was last built with
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RootInstallConfig {
    pub enabled: bool,
    pub device: String,
    pub flags: Vec<String>,
}

/// Global build rules (`configs/build_rules.yaml`)
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct BuildRules {
    pub global: GlobalRules,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GlobalRules {
    pub architectures: ArchitectureRules,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ArchitectureRules {
    /// Native library architectures removed from patched APKs
    pub strip: Vec<String>,
}

/// A workspace root plus its tool configuration.
///
/// Every relative path in the configuration is resolved against `root`,
/// never against the process working directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    root: PathBuf,
    pub tools: ToolsConfig,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, tools: ToolsConfig) -> Self {
        Self {
            root: root.into(),
            tools,
        }
    }

    /// Load `patchkit.yaml` (or `config_file`) for the workspace at `root`.
    ///
    /// A missing default config file yields the defaults; a missing explicit
    /// one is an error.
    pub fn load(root: &Path, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let tools = match config_file {
            Some(file) => load_yaml(&resolve(root, file))?,
            None => {
                let default_file = root.join(DEFAULT_CONFIG_FILE);
                if default_file.exists() {
                    load_yaml(&default_file)?
                } else {
                    ToolsConfig::default()
                }
            }
        };

        Ok(Self::new(root, tools))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a configured path against the workspace root
    pub fn path(&self, path: &Path) -> PathBuf {
        resolve(&self.root, path)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.path(&self.tools.download_dir)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.path(&self.tools.dist_dir)
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.path(&self.tools.lockfile)
    }

    /// Load `configs/apps/<app>.yaml`
    pub fn app_config(&self, app_name: &str) -> Result<AppConfig, ConfigError> {
        let path = self
            .path(&self.tools.apps_dir)
            .join(format!("{}.yaml", app_name));
        if !path.exists() {
            return Err(ConfigError::UnknownApp(app_name.to_string()));
        }
        load_yaml(&path)
    }

    /// Load `configs/applications.yaml`, keeping file order
    pub fn applications(&self) -> Result<IndexMap<String, AppConfig>, ConfigError> {
        load_yaml(&self.path(&self.tools.applications))
    }

    /// Load `configs/build_rules.yaml`; missing file means no rules
    pub fn build_rules(&self) -> Result<BuildRules, ConfigError> {
        let path = self.path(&self.tools.build_rules);
        if !path.exists() {
            return Ok(BuildRules::default());
        }
        load_yaml(&path)
    }

    /// Manifest source configured for this workspace, if any
    pub fn manifest_source(&self) -> Option<Box<dyn ManifestSource>> {
        manifest_source_for(&self.root, &self.tools.manifest)
    }
}

/// Build a manifest source from a location given as a URL or a path
pub fn manifest_source_from_arg(root: &Path, location: &str) -> Box<dyn ManifestSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(RemoteManifestSource::new(location))
    } else {
        Box::new(LocalManifestSource::new(resolve(root, Path::new(location))))
    }
}

fn manifest_source_for(root: &Path, config: &ManifestConfig) -> Option<Box<dyn ManifestSource>> {
    if let Some(url) = &config.url {
        return Some(Box::new(RemoteManifestSource::new(url)));
    }
    config
        .path
        .as_ref()
        .map(|path| Box::new(LocalManifestSource::new(resolve(root, path))) as Box<dyn ManifestSource>)
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Read and deserialize a YAML file
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the path to the data directory for apk-patchkit.
/// Uses $XDG_DATA_HOME/apk-patchkit if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/apk-patchkit,
/// or ./apk-patchkit if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("apk-patchkit.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("apk-patchkit")
}
