//! Tracing setup
//!
//! Human-readable compact logs go to stderr; JSON logs go to a file in the
//! data directory through a non-blocking writer. `RUST_LOG` overrides the
//! configured level.

use std::path::Path;

use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Build the level filter, preferring `RUST_LOG` when it is set and valid
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber.
///
/// If `log_file` cannot be opened, only stderr logging is installed and the
/// failure is logged; `None` is returned in that case. Otherwise the guard
/// flushes the file writer on drop and must be kept alive for the lifetime
/// of the program.
pub fn init(default_level: &str, log_file: &Path) -> anyhow::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    match file_appender(log_file) {
        Ok(appender) => {
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(env_filter(default_level))
                .with(stderr_layer)
                .with(fmt::layer().json().with_writer(file_writer))
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

            debug!(
                version = env!("CARGO_PKG_VERSION"),
                log_file = %log_file.display(),
                "Logging initialized"
            );
            Ok(Some(guard))
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(env_filter(default_level))
                .with(stderr_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

            warn!(
                "File logging disabled, cannot open {}: {}",
                log_file.display(),
                e
            );
            Ok(None)
        }
    }
}

/// Open `log_file` for appending, creating its directory first
fn file_appender(log_file: &Path) -> anyhow::Result<RollingFileAppender> {
    let directory = log_file.parent().unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {}", log_file.display()))?;

    std::fs::create_dir_all(directory)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)?;
    Ok(appender)
}
