//! Workspace test utilities

use std::path::Path;

use tempfile::TempDir;

use apk_patchkit::config::Workspace;

/// Create a workspace in a temp directory populated with `files`
/// (relative path, content). `patchkit.yaml` is picked up if present.
pub fn create_test_workspace(files: &[(&str, &str)]) -> (TempDir, Workspace) {
    let temp_dir = TempDir::new().unwrap();
    for (path, content) in files {
        write_file(temp_dir.path(), path, content);
    }
    let workspace = Workspace::load(temp_dir.path(), None).unwrap();
    (temp_dir, workspace)
}

pub fn write_file(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}
