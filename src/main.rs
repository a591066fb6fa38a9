use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use apk_patchkit::config::{self, Workspace, manifest_source_from_arg};
use apk_patchkit::logging;
use apk_patchkit::pipeline::{download, merge, patch};
use apk_patchkit::process::TokioCommandRunner;
use apk_patchkit::update::{Lockfile, UpdateChecker};
use apk_patchkit::version::registries::{ApkMirrorRegistry, GitHubReleaseRegistry};
use apk_patchkit::version::resolver::{LatestVersionResolver, resolve_compatible_versions};
use apk_patchkit::version::resolvers::resolver_for;

#[derive(Parser)]
#[command(name = "apk-patchkit")]
#[command(version, about = "Download, merge and patch Android apps at patch-compatible versions")]
struct Cli {
    /// Workspace root; configured relative paths resolve against it
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Tool configuration file (default: <root>/patchkit.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the latest patch-compatible version of a package
    Resolve {
        /// Android package id
        #[arg(long)]
        package: String,
        /// Manifest path or URL (default: the configured manifest)
        #[arg(long)]
        manifest: Option<String>,
        /// Print every compatible version, lowest first
        #[arg(long)]
        all: bool,
    },
    /// Download an app with apkmd
    Download {
        /// App name under configs/apps
        #[arg(long)]
        app: String,
        #[arg(long)]
        debug: bool,
    },
    /// Merge split bundles in the download directory
    Merge,
    /// Patch merged APKs in the download directory
    Patch,
    /// Check upstream for new app and patch releases
    Check {
        /// Report only; leave the lockfile untouched
        #[arg(long)]
        no_write: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&cli.log_level, &config::log_path())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };
    let workspace = Workspace::load(&root, cli.config.as_deref())?;
    let resolver = resolver_for(workspace.tools.resolver.latest);

    match cli.command {
        Command::Resolve {
            package,
            manifest,
            all,
        } => resolve(&workspace, resolver.as_ref(), &package, manifest.as_deref(), all).await,
        Command::Download { app, debug } => {
            let app_config = workspace.app_config(&app)?;
            let source = workspace.manifest_source();
            let version =
                download::resolve_app_version(&app_config, source.as_deref(), resolver.as_ref())
                    .await?;
            let outcome = download::download_apk(
                &workspace,
                &TokioCommandRunner,
                &app,
                &app_config,
                &version,
                debug,
            )
            .await?;
            println!("Download completed successfully");
            print!("{}", outcome.stdout);
            Ok(())
        }
        Command::Merge => {
            let merged = merge::merge_all(&workspace, &TokioCommandRunner).await?;
            if merged.is_empty() {
                println!("Nothing to merge");
            }
            for path in merged {
                println!("Created merged APK: {}", file_name(&path));
            }
            Ok(())
        }
        Command::Patch => {
            let apps = workspace.applications()?;
            let rules = workspace.build_rules()?;
            let patched = patch::patch_all(&workspace, &TokioCommandRunner, &apps, &rules).await?;
            if patched.is_empty() {
                println!("Nothing to patch");
            }
            for path in patched {
                println!("Patched APK: {}", file_name(&path));
            }
            Ok(())
        }
        Command::Check { no_write } => check(&workspace, resolver.as_ref(), no_write).await,
    }
}

async fn resolve(
    workspace: &Workspace,
    resolver: &dyn LatestVersionResolver,
    package: &str,
    manifest: Option<&str>,
    all: bool,
) -> anyhow::Result<()> {
    let source = match manifest {
        Some(location) => manifest_source_from_arg(workspace.root(), location),
        None => workspace
            .manifest_source()
            .context("No patch manifest configured; pass --manifest")?,
    };
    let manifest = source.load().await?;

    if all {
        let versions = resolve_compatible_versions(&manifest, package);
        if versions.is_empty() {
            bail!("No compatible version of {} in {}", package, source.describe());
        }
        for version in versions {
            println!("{}", version);
        }
    } else {
        let Some(version) = resolver.resolve_latest(&manifest, package) else {
            bail!("No compatible version of {} in {}", package, source.describe());
        };
        println!("{}", version);
    }
    Ok(())
}

async fn check(
    workspace: &Workspace,
    resolver: &dyn LatestVersionResolver,
    no_write: bool,
) -> anyhow::Result<()> {
    let apps = workspace.applications()?;
    let lock_path = workspace.lockfile_path();
    let mut lock = Lockfile::load(&lock_path)?;
    if lock.is_empty() {
        info!("No versions recorded in {}, comparing against app configs", lock_path.display());
    } else {
        debug!("Loaded {} lockfile entries from {}", lock.len(), lock_path.display());
    }

    let manifest = match workspace.manifest_source() {
        Some(source) => Some(source.load().await?),
        None => None,
    };

    let apk_registry = ApkMirrorRegistry::new(&workspace.tools.apkmirror_base_url);
    let patch_registry = GitHubReleaseRegistry::new(&workspace.tools.github_base_url);
    let mut checker = UpdateChecker::new(&apk_registry, &patch_registry, resolver);
    if let Some(manifest) = &manifest {
        checker = checker.with_manifest(manifest);
    }

    let report = checker.check_all(&apps, &lock).await;

    if report.updates.is_empty() {
        println!("All apps up to date");
    } else {
        println!("Updates available:");
        for update in &report.updates {
            println!("{}", update);
        }
        if !no_write {
            for update in &report.updates {
                lock.record(update);
            }
            lock.save(&lock_path)?;
        }
    }

    for (app, error) in &report.failures {
        eprintln!("{}: {}", app, error);
    }
    if !report.failures.is_empty() {
        bail!("{} app(s) could not be checked", report.failures.len());
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
