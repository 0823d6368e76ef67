//! Command implementations.

pub mod config;
pub mod sizes;
pub mod thumb;
pub mod thumbs;

use std::path::{Path, PathBuf};

use lumen_core::Config;

/// Load the config file and apply a `--cache-dir` override.
pub(crate) fn load_config(cache_dir: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if let Some(dir) = cache_dir {
        config.general.cache_dir = expand(dir);
    }
    Ok(config)
}

/// Expand a leading `~` in a path given on the command line.
pub(crate) fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
