//! File logging for the dashboard.
//!
//! The terminal belongs to the TUI while it runs, so log records go to a
//! file. Logging is only installed in debug mode.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::cache::CacheManager;

/// Environment variable that overrides the configured log filter
pub const LOG_ENV: &str = "DATADASH_LOG";

/// Resolve the log file: an explicit path wins, otherwise the cache directory
pub fn log_path(explicit: Option<&Path>, cache: &CacheManager) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => {
            cache.ensure_cache_dir()?;
            Ok(cache.log_file())
        }
    }
}

/// Install a global tracing subscriber appending to `path`.
///
/// The filter comes from `DATADASH_LOG` when set, else from `default_level`.
pub fn init(path: &Path, default_level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eyre!("Could not open log file {}: {}", path.display(), e))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| eyre!("Invalid log filter '{}': {}", default_level, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("Could not install logger: {}", e))?;

    tracing::info!(log_file = %path.display(), "logging initialized");
    Ok(())
}
