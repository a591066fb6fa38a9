//! Version layer for patch compatibility and upstream release checks
//!
//! This module loads patch manifests, resolves which application versions
//! the patches support, and looks up the newest upstream releases.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│  Manifest   │────▶│  Resolver   │
//! │(file, http) │     │ (normalize) │     │  (latest)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │ Registries  │                         │   Natural   │
//! │(apk, patch) │                         │ (ordering)  │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`manifest`]: Patch manifest parsing and shape normalization
//! - [`natural`]: Natural (segment-wise numeric) version ordering
//! - [`resolver`]: Compatible version resolution and the latest-version trait
//! - [`resolvers`]: Latest-version strategies (natural max, manifest order)
//! - [`source`]: Trait for loading a manifest
//! - [`sources`]: Local file and HTTP manifest sources
//! - [`registry`]: Traits for upstream APK and patch release lookups
//! - [`registries`]: APKMirror and GitHub Releases implementations
//! - [`error`]: Error types for manifest and registry operations

pub mod error;
pub mod manifest;
pub mod natural;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod resolvers;
pub mod source;
pub mod sources;

pub use manifest::{PatchDescriptor, PatchManifest};
pub use resolver::{LatestVersionResolver, latest_compatible_version, resolve_compatible_versions};
