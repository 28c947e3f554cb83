//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod output;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use invex_core::models::InvexConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invex")
        .join("config.json")
}

/// Configuration file in effect: the `--config` argument, else the default path.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load the configuration in effect.
///
/// An explicit `--config` file must exist. The default file is optional and
/// falls back to built-in defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<InvexConfig> {
    if let Some(path) = explicit {
        return read_config(Path::new(path));
    }

    let path = default_config_path();
    if path.exists() {
        read_config(&path)
    } else {
        debug!("No config file at {}, using defaults", path.display());
        Ok(InvexConfig::default())
    }
}

fn read_config(path: &Path) -> anyhow::Result<InvexConfig> {
    debug!("Loading config from {}", path.display());
    InvexConfig::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e))
}
