//! Update detection for configured apps
//!
//! For every app, compares what was recorded last time (lockfile entry, or
//! the app configuration when nothing is recorded yet) with:
//! - the newest upstream APK release
//! - the newest patch bundle release
//! - the newest APK version the patch manifest declares compatible

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use indexmap::IndexMap;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::{AppConfig, FETCH_STAGGER_DELAY_MS};
use crate::update::error::UpdateError;
use crate::update::lockfile::Lockfile;
use crate::version::manifest::PatchManifest;
use crate::version::registry::{ApkRegistry, PatchRegistry};
use crate::version::resolver::LatestVersionResolver;

/// Recorded value vs. upstream value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub current: String,
    pub latest: String,
}

impl VersionChange {
    pub fn new(current: &str, latest: &str) -> Self {
        Self {
            current: current.to_string(),
            latest: latest.to_string(),
        }
    }

    pub fn is_changed(&self) -> bool {
        self.current != self.latest
    }
}

impl fmt::Display for VersionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.current, self.latest)
    }
}

/// Result of checking one app
#[derive(Debug, Clone, PartialEq)]
pub struct AppUpdate {
    pub app: String,
    pub apk: VersionChange,
    pub patch: VersionChange,
    /// Present when the patch manifest names a compatible version
    pub compatible: Option<VersionChange>,
    pub checked_at: DateTime<Utc>,
}

impl AppUpdate {
    pub fn has_changes(&self) -> bool {
        self.apk.is_changed()
            || self.patch.is_changed()
            || self.compatible.as_ref().is_some_and(VersionChange::is_changed)
    }
}

impl fmt::Display for AppUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: APK {}, Patch {}", self.app, self.apk, self.patch)?;
        if let Some(compatible) = &self.compatible {
            write!(f, ", Compatible {}", compatible)?;
        }
        Ok(())
    }
}

/// Outcome of checking every configured app
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Apps with at least one changed version, in configuration order
    pub updates: Vec<AppUpdate>,
    /// Apps whose check failed
    pub failures: Vec<(String, UpdateError)>,
}

/// Checks configured apps against upstream registries and the patch manifest
pub struct UpdateChecker<'a> {
    apk_registry: &'a dyn ApkRegistry,
    patch_registry: &'a dyn PatchRegistry,
    manifest: Option<&'a PatchManifest>,
    resolver: &'a dyn LatestVersionResolver,
}

impl<'a> UpdateChecker<'a> {
    pub fn new(
        apk_registry: &'a dyn ApkRegistry,
        patch_registry: &'a dyn PatchRegistry,
        resolver: &'a dyn LatestVersionResolver,
    ) -> Self {
        Self {
            apk_registry,
            patch_registry,
            manifest: None,
            resolver,
        }
    }

    /// Also report the latest patch-compatible version
    pub fn with_manifest(mut self, manifest: &'a PatchManifest) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Check a single app
    pub async fn check_app(
        &self,
        name: &str,
        app: &AppConfig,
        lock: &Lockfile,
    ) -> Result<AppUpdate, UpdateError> {
        let entry = lock.get(name);

        let latest_apk = self
            .apk_registry
            .latest_version(&app.source.org, &app.source.repo)
            .await
            .map_err(UpdateError::ApkRegistry)?;
        let current_apk = entry
            .map(|e| e.apk_version.as_str())
            .unwrap_or(app.version.as_str());

        let current_patch = entry
            .map(|e| e.patch_version.as_str())
            .or(app.patches.version.as_deref())
            .unwrap_or("unknown");
        let latest_patch = match &app.patches.source {
            Some(repository) => self
                .patch_registry
                .latest_release(repository)
                .await
                .map_err(UpdateError::PatchRegistry)?,
            None => {
                debug!("{} has no patch source, skipping patch check", name);
                current_patch.to_string()
            }
        };

        let compatible = self
            .manifest
            .and_then(|manifest| self.resolver.resolve_latest(manifest, &app.package))
            .map(|latest| {
                let current = entry
                    .and_then(|e| e.compatible_version.as_deref())
                    .unwrap_or("none");
                VersionChange::new(current, &latest)
            });

        Ok(AppUpdate {
            app: name.to_string(),
            apk: VersionChange::new(current_apk, &latest_apk),
            patch: VersionChange::new(current_patch, &latest_patch),
            compatible,
            checked_at: Utc::now(),
        })
    }

    /// Check every app concurrently.
    ///
    /// Start times are staggered to avoid upstream rate limits. A failing app
    /// is logged and reported without affecting the others.
    pub async fn check_all(
        &self,
        apps: &IndexMap<String, AppConfig>,
        lock: &Lockfile,
    ) -> UpdateReport {
        let futures = apps.iter().enumerate().map(|(i, (name, app))| {
            let delay = Duration::from_millis(FETCH_STAGGER_DELAY_MS * i as u64);
            async move {
                sleep(delay).await;
                (name, self.check_app(name, app, lock).await)
            }
        });

        let mut report = UpdateReport::default();
        for (name, result) in join_all(futures).await {
            match result {
                Ok(update) if update.has_changes() => {
                    info!("Update available: {}", update);
                    report.updates.push(update);
                }
                Ok(_) => debug!("{} is up to date", name),
                Err(e) => {
                    error!("Failed to check {}: {}", name, e);
                    report.failures.push((name.clone(), e));
                }
            }
        }
        report
    }
}
