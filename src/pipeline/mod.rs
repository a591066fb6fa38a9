//! APK build pipeline
//!
//! Each step shells out to an external tool through
//! [`CommandRunner`](crate::process::CommandRunner):
//!
//! - [`download`]: resolve the app version and fetch it with `apkmd`
//! - [`merge`]: merge split bundles (`.apks`, `.xapk`, `.apkm`) with APKEditor
//! - [`patch`]: apply patches with the patcher CLI

pub mod download;
pub mod error;
pub mod merge;
pub mod patch;

pub use error::PipelineError;

use crate::process::CommandResult;

/// Turn a non-zero exit into [`PipelineError::ToolFailed`]
pub(crate) fn ensure_success(tool: &str, result: CommandResult) -> Result<CommandResult, PipelineError> {
    if result.success {
        Ok(result)
    } else {
        Err(PipelineError::ToolFailed {
            tool: tool.to_string(),
            code: result.exit_code,
            stderr: result.stderr.trim().to_string(),
        })
    }
}
