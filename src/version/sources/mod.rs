//! Manifest source implementations

pub mod local;
pub mod remote;

pub use local::LocalManifestSource;
pub use remote::RemoteManifestSource;
