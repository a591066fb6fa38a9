//! Split-APK bundle merging through APKEditor

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Workspace;
use crate::pipeline::{PipelineError, ensure_success};
use crate::process::CommandRunner;

/// Bundle formats that must be merged into a single APK before patching
pub const MERGEABLE_EXTENSIONS: &[&str] = &["apks", "xapk", "apkm"];

/// Whether `path` is a split bundle (extension match is case-insensitive)
pub fn needs_merging(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MERGEABLE_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

/// `<dir>/<stem>_merged.apk` next to the input bundle
pub fn merged_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_merged.apk", stem))
}

pub fn merge_args(workspace: &Workspace, input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-jar".to_string(),
        workspace
            .path(&workspace.tools.apk_editor_jar)
            .display()
            .to_string(),
        "m".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-o".to_string(),
        output.display().to_string(),
    ]
}

/// Merge one bundle and return the merged APK path
pub async fn merge_splits<R: CommandRunner + ?Sized>(
    workspace: &Workspace,
    runner: &R,
    input: &Path,
) -> Result<PathBuf, PipelineError> {
    let output = merged_output_path(input);
    let result = runner
        .run(&workspace.tools.java, &merge_args(workspace, input, &output))
        .await?;
    ensure_success("APKEditor", result)?;
    Ok(output)
}

/// Merge every bundle in the download directory, in file name order
pub async fn merge_all<R: CommandRunner + ?Sized>(
    workspace: &Workspace,
    runner: &R,
) -> Result<Vec<PathBuf>, PipelineError> {
    let download_dir = workspace.download_dir();
    let bundles = list_files(&download_dir, needs_merging).await?;

    let mut merged = Vec::with_capacity(bundles.len());
    for bundle in bundles {
        info!("Merging {}", bundle.display());
        let output = merge_splits(workspace, runner, &bundle).await?;
        info!("Created merged APK: {}", output.display());
        merged.push(output);
    }
    Ok(merged)
}

/// Files in `dir` accepted by `filter`, sorted by path
pub(crate) async fn list_files(
    dir: &Path,
    filter: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| PipelineError::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PipelineError::io(dir, e))?
    {
        let path = entry.path();
        if path.is_file() && filter(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
