//! Patch application through the patcher CLI

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::config::{AppConfig, BuildRules, Workspace};
use crate::pipeline::merge::list_files;
use crate::pipeline::{PipelineError, ensure_success};
use crate::process::CommandRunner;

const MERGED_SUFFIX: &str = "_merged";

/// `<dist>/<stem>_patched.apk`
pub fn patched_output_path(dist_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    dist_dir.join(format!("{}_patched.apk", stem))
}

/// Name an APK was downloaded under: its stem without a trailing `_merged`
pub fn app_key_for(apk: &Path) -> Option<String> {
    let stem = apk.file_stem()?.to_str()?;
    Some(stem.strip_suffix(MERGED_SUFFIX).unwrap_or(stem).to_string())
}

/// Find the app configuration for an APK by app name or package id
pub fn find_app<'a>(
    apps: &'a IndexMap<String, AppConfig>,
    key: &str,
) -> Option<(&'a str, &'a AppConfig)> {
    apps.get_key_value(key)
        .or_else(|| apps.iter().find(|(_, app)| app.package == key))
        .map(|(name, app)| (name.as_str(), app))
}

/// Arguments for `java` running the patcher CLI
///
/// Order: patch bundle and options, output, root install, per-patch
/// enable/disable flags, stripped native architectures, input APK last.
pub fn patch_args(
    workspace: &Workspace,
    app: &AppConfig,
    rules: &BuildRules,
    input: &Path,
    output: &Path,
) -> Vec<String> {
    let tools = &workspace.tools;
    let mut args = vec![
        "-jar".to_string(),
        workspace.path(&tools.patcher_jar).display().to_string(),
        "patch".to_string(),
        "-p".to_string(),
        workspace.path(&tools.patch_bundle).display().to_string(),
        format!(
            "--legacy-options={}",
            workspace.path(&tools.patch_options).display()
        ),
        "--purge".to_string(),
        "-o".to_string(),
        output.display().to_string(),
    ];

    if app.root_install.enabled {
        args.push("-i".to_string());
        args.push(app.root_install.device.clone());
        args.push("--mount".to_string());
        args.extend(app.root_install.flags.iter().cloned());
    }

    for name in &app.patches.include {
        args.push("-e".to_string());
        args.push(name.clone());
    }
    for name in &app.patches.exclude {
        args.push("-d".to_string());
        args.push(name.clone());
    }

    for arch in &rules.global.architectures.strip {
        args.push("--rip-lib".to_string());
        args.push(arch.clone());
    }

    args.push(input.display().to_string());
    args
}

/// Patch one APK into the dist directory and return the output path
pub async fn apply_patches<R: CommandRunner + ?Sized>(
    workspace: &Workspace,
    runner: &R,
    app: &AppConfig,
    rules: &BuildRules,
    input: &Path,
) -> Result<PathBuf, PipelineError> {
    let dist_dir = workspace.dist_dir();
    tokio::fs::create_dir_all(&dist_dir)
        .await
        .map_err(|e| PipelineError::io(&dist_dir, e))?;

    let output = patched_output_path(&dist_dir, input);
    let args = patch_args(workspace, app, rules, input, &output);
    let result = runner.run(&workspace.tools.java, &args).await?;
    ensure_success("patcher", result)?;
    Ok(output)
}

/// Patch every APK in the download directory that has an app configuration
pub async fn patch_all<R: CommandRunner + ?Sized>(
    workspace: &Workspace,
    runner: &R,
    apps: &IndexMap<String, AppConfig>,
    rules: &BuildRules,
) -> Result<Vec<PathBuf>, PipelineError> {
    let apks = list_files(&workspace.download_dir(), is_apk).await?;

    let mut patched = Vec::new();
    for apk in apks {
        let Some(key) = app_key_for(&apk) else {
            continue;
        };
        let Some((name, app)) = find_app(apps, &key) else {
            warn!("No app configuration for {}, skipping", apk.display());
            continue;
        };

        info!("Patching {}...", name);
        let output = apply_patches(workspace, runner, app, rules, &apk).await?;
        info!("Patched APK: {}", output.display());
        patched.push(output);
    }
    Ok(patched)
}

fn is_apk(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("apk"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArchitectureRules, GlobalRules, ToolsConfig};
    use crate::process::{CommandResult, MockCommandRunner};
    use rstest::rstest;
    use tempfile::TempDir;

    fn app(package: &str) -> AppConfig {
        serde_yaml::from_str(&format!(
            "package: {}\nsource: {{org: acme, repo: app}}\npatches:\n  include: [Hide ads, SponsorBlock]\n  exclude: [Custom branding]\n",
            package
        ))
        .unwrap()
    }

    fn strip_rules(archs: &[&str]) -> BuildRules {
        BuildRules {
            global: GlobalRules {
                architectures: ArchitectureRules {
                    strip: archs.iter().map(|s| s.to_string()).collect(),
                },
            },
        }
    }

    #[test]
    fn patch_args_builds_full_command_line() {
        let workspace = Workspace::new("/w", ToolsConfig::default());
        let mut app = app("com.app.a");
        app.root_install.enabled = true;
        app.root_install.device = "emulator-5554".to_string();
        app.root_install.flags = vec!["--force".to_string()];

        let args = patch_args(
            &workspace,
            &app,
            &strip_rules(&["x86", "x86_64"]),
            Path::new("/w/downloads/a_merged.apk"),
            Path::new("/w/dist/a_merged_patched.apk"),
        );

        assert_eq!(
            args,
            vec![
                "-jar",
                "/w/revanced-cli-all.jar",
                "patch",
                "-p",
                "/w/patches.rvp",
                "--legacy-options=/w/options.json",
                "--purge",
                "-o",
                "/w/dist/a_merged_patched.apk",
                "-i",
                "emulator-5554",
                "--mount",
                "--force",
                "-e",
                "Hide ads",
                "-e",
                "SponsorBlock",
                "-d",
                "Custom branding",
                "--rip-lib",
                "x86",
                "--rip-lib",
                "x86_64",
                "/w/downloads/a_merged.apk",
            ]
        );
    }

    #[test]
    fn patch_args_omits_root_install_when_disabled() {
        let workspace = Workspace::new("/w", ToolsConfig::default());

        let args = patch_args(
            &workspace,
            &app("com.app.a"),
            &BuildRules::default(),
            Path::new("in.apk"),
            Path::new("out.apk"),
        );

        assert!(!args.contains(&"--mount".to_string()));
        assert!(!args.contains(&"--rip-lib".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("in.apk"));
    }

    #[rstest]
    #[case("downloads/youtube_merged.apk", Some("youtube"))]
    #[case("downloads/com.app.a.apk", Some("com.app.a"))]
    #[case("downloads/my_app_merged.apk", Some("my_app"))]
    fn app_key_for_returns_expected(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(app_key_for(Path::new(path)).as_deref(), expected);
    }

    #[test]
    fn find_app_matches_name_then_package() {
        let apps = IndexMap::from([
            ("youtube".to_string(), app("com.google.android.youtube")),
            ("music".to_string(), app("com.google.android.apps.youtube.music")),
        ]);

        assert_eq!(find_app(&apps, "youtube").map(|(name, _)| name), Some("youtube"));
        assert_eq!(
            find_app(&apps, "com.google.android.apps.youtube.music").map(|(name, _)| name),
            Some("music")
        );
        assert!(find_app(&apps, "com.unknown.pkg").is_none());
    }

    #[tokio::test]
    async fn patch_all_patches_configured_apks_and_skips_others() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path(), ToolsConfig::default());
        let downloads = workspace.download_dir();
        std::fs::create_dir_all(&downloads).unwrap();
        for name in ["youtube_merged.apk", "unknown_merged.apk", "youtube.apkm"] {
            std::fs::write(downloads.join(name), b"").unwrap();
        }
        let apps = IndexMap::from([("youtube".to_string(), app("com.google.android.youtube"))]);

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|program, args| {
                program == "java" && args.last().is_some_and(|a| a.ends_with("youtube_merged.apk"))
            })
            .times(1)
            .returning(|_, _| Ok(CommandResult::ok("")));

        let patched = patch_all(&workspace, &runner, &apps, &BuildRules::default())
            .await
            .unwrap();

        assert_eq!(
            patched,
            vec![workspace.dist_dir().join("youtube_merged_patched.apk")]
        );
        assert!(workspace.dist_dir().is_dir());
    }

    #[tokio::test]
    async fn apply_patches_reports_tool_failure() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path(), ToolsConfig::default());
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_, _| Ok(CommandResult::failed(1, "Patch 'Hide ads' failed")));

        let result = apply_patches(
            &workspace,
            &runner,
            &app("com.app.a"),
            &BuildRules::default(),
            Path::new("a_merged.apk"),
        )
        .await;

        assert!(matches!(
            result,
            Err(PipelineError::ToolFailed { tool, stderr, .. })
                if tool == "patcher" && stderr.contains("Hide ads")
        ));
    }

    #[tokio::test]
    async fn patch_all_accepts_unmerged_and_package_named_apks() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::new(temp_dir.path(), ToolsConfig::default());
        let downloads = workspace.download_dir();
        std::fs::create_dir_all(&downloads).unwrap();
        for name in ["com.google.android.apps.youtube.music_merged.apk", "youtube.APK"] {
            std::fs::write(downloads.join(name), b"").unwrap();
        }
        let apps = IndexMap::from([
            ("youtube".to_string(), app("com.google.android.youtube")),
            ("music".to_string(), app("com.google.android.apps.youtube.music")),
        ]);

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(2)
            .returning(|_, _| Ok(CommandResult::ok("")));

        let patched = patch_all(&workspace, &runner, &apps, &BuildRules::default())
            .await
            .unwrap();

        assert_eq!(
            patched,
            vec![
                workspace
                    .dist_dir()
                    .join("com.google.android.apps.youtube.music_merged_patched.apk"),
                workspace.dist_dir().join("youtube_patched.apk"),
            ]
        );
    }
}
