//! Upstream update checks and the version lockfile
//!
//! - [`checker`]: compares recorded versions with upstream releases and the
//!   latest patch-compatible version
//! - [`lockfile`]: `versions.lock` persistence

pub mod checker;
pub mod error;
pub mod lockfile;

pub use checker::{AppUpdate, UpdateChecker, UpdateReport, VersionChange};
pub use error::UpdateError;
pub use lockfile::{LockEntry, Lockfile};
