//! Patch manifest parsing
//!
//! Manifest producers disagree on how a patch lists its compatible packages:
//!
//! ```text
//! {"compatiblePackages": {"com.app": ["1.0", "1.1"]}}
//! {"compatiblePackages": [{"name": "com.app", "versions": ["1.0", "1.1"]}]}
//! ```
//!
//! Both shapes are normalized here, at load time, into a single
//! `package -> versions` mapping per descriptor. Descriptors whose
//! compatibility field is missing or has any other shape are kept with an
//! empty mapping; only a document that is not a JSON array is rejected.

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::version::error::ManifestError;

const COMPATIBILITY_FIELDS: &[&str] = &["compatiblePackages", "compatible_packages"];

/// Compatibility field as it appears in the document
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCompatibility {
    Mapping(serde_json::Map<String, Value>),
    Records(Vec<Value>),
}

/// One entry of a list-shaped compatibility field
#[derive(Debug, Deserialize)]
struct RawPackageRecord {
    #[serde(alias = "packageName")]
    name: String,
    #[serde(default, alias = "compatibleVersions")]
    versions: Option<Vec<Value>>,
}

/// A single patch and the package versions it declares compatibility with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchDescriptor {
    /// Patch name, when the producer includes one
    pub name: Option<String>,
    /// Package id -> versions, in discovery order
    compatible: IndexMap<String, IndexSet<String>>,
}

impl PatchDescriptor {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            compatible: IndexMap::new(),
        }
    }

    /// Add compatible versions for a package
    pub fn with_versions<I, S>(mut self, package: &str, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible
            .entry(package.to_string())
            .or_default()
            .extend(versions.into_iter().map(Into::into));
        self
    }

    /// Versions declared for `package`, in the order the manifest listed them
    pub fn versions_for(&self, package: &str) -> Option<&IndexSet<String>> {
        self.compatible.get(package)
    }

    /// Package ids this descriptor mentions
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.compatible.keys().map(String::as_str)
    }

    fn from_value(index: usize, value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            debug!("Skipping descriptor #{}: not an object", index);
            return Self::default();
        };

        let mut descriptor = Self::new(object.get("name").and_then(Value::as_str).map(String::from));

        let Some(field) = COMPATIBILITY_FIELDS
            .iter()
            .find_map(|key| object.get(*key))
        else {
            debug!("Descriptor #{} has no compatibility field", index);
            return descriptor;
        };

        match serde_json::from_value::<RawCompatibility>(field.clone()) {
            Ok(RawCompatibility::Mapping(mapping)) => {
                for (package, versions) in mapping {
                    descriptor.insert_versions(package, &versions);
                }
            }
            Ok(RawCompatibility::Records(records)) => {
                for record in records {
                    match serde_json::from_value::<RawPackageRecord>(record) {
                        Ok(record) => {
                            let versions = record.versions.map(Value::Array).unwrap_or(Value::Null);
                            descriptor.insert_versions(record.name, &versions);
                        }
                        Err(e) => debug!("Skipping package record in descriptor #{}: {}", index, e),
                    }
                }
            }
            Err(_) => {
                debug!(
                    "Skipping compatibility field of descriptor #{}: unexpected shape {}",
                    index, field
                );
            }
        }

        descriptor
    }

    /// A `null` list means "any version" to some producers; it names no
    /// concrete version so nothing is recorded.
    fn insert_versions(&mut self, package: String, versions: &Value) {
        let Some(list) = versions.as_array() else {
            return;
        };

        let entry = self.compatible.entry(package).or_default();
        entry.extend(
            list.iter()
                .filter_map(Value::as_str)
                .filter(|v| !v.is_empty())
                .map(String::from),
        );
    }
}

/// Ordered list of patch descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchManifest {
    descriptors: Vec<PatchDescriptor>,
}

impl PatchManifest {
    pub fn new(descriptors: Vec<PatchDescriptor>) -> Self {
        Self { descriptors }
    }

    pub fn from_json_str(content: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::DataFormat(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_slice(content: &[u8]) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_slice(content)
            .map_err(|e| ManifestError::DataFormat(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ManifestError> {
        let Value::Array(items) = value else {
            return Err(ManifestError::DataFormat(format!(
                "expected a JSON array at the top level, found {}",
                json_kind(&value)
            )));
        };

        let descriptors = items
            .iter()
            .enumerate()
            .map(|(i, item)| PatchDescriptor::from_value(i, item))
            .collect();

        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[PatchDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
