//! Version lockfile (`versions.lock`)
//!
//! Records, per app, the APK and patch versions seen by the last update
//! check. Stored as YAML, keyed by app name in sorted order.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::update::checker::AppUpdate;
pub use crate::update::error::LockfileError;

/// A locked app entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockEntry {
    pub apk_version: String,
    pub patch_version: String,
    /// Latest patch-compatible APK version, when a manifest was available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_version: Option<String>,
    pub last_checked: DateTime<Utc>,
}

/// The lockfile structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lockfile {
    entries: BTreeMap<String, LockEntry>,
}

impl Lockfile {
    /// Load lockfile from path; a missing or empty file is an empty lockfile
    pub fn load(path: &Path) -> Result<Self, LockfileError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No lockfile at {}, starting empty", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Save lockfile to path
    pub fn save(&self, path: &Path) -> Result<(), LockfileError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, app: &str) -> Option<&LockEntry> {
        self.entries.get(app)
    }

    /// Overwrite the entry for an app with the latest observed versions.
    ///
    /// A previously recorded compatible version is kept when the update
    /// carries none.
    pub fn record(&mut self, update: &AppUpdate) {
        let compatible_version = update
            .compatible
            .as_ref()
            .map(|change| change.latest.clone())
            .or_else(|| {
                self.entries
                    .get(&update.app)
                    .and_then(|entry| entry.compatible_version.clone())
            });

        self.entries.insert(
            update.app.clone(),
            LockEntry {
                apk_version: update.apk.latest.clone(),
                patch_version: update.patch.latest.clone(),
                compatible_version,
                last_checked: update.checked_at,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
