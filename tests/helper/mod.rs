//! Shared test utilities

#![allow(dead_code, unused_imports)]

mod registry;
mod runner;
mod workspace;

pub use registry::{StaticApkRegistry, StaticPatchRegistry};
pub use runner::{Invocation, RecordingRunner};
pub use workspace::{create_test_workspace, write_file};
