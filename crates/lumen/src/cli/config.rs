//! The `lumen config` command for configuration management.

use std::path::Path;

use clap::{Args, Subcommand};
use lumen_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,

    /// Show config file and cache directory paths
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            let config = Config::load()?;
            println!("config: {}", Config::default_path().display());
            println!("cache:  {}", config.cache_dir().display());
        }

        ConfigCommand::Init { force } => {
            let config = Config::default();
            let path = Config::default_path();
            init_at(&path, &config, force)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("config: {}", path.display());
            println!("cache:  {}", config.cache_dir().display());
        }
    }

    Ok(())
}

/// Write `config` to `path` and create its thumbnail cache root.
fn init_at(path: &Path, config: &Config, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml()?)?;
    std::fs::create_dir_all(config.cache_dir())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.general.cache_dir = dir.join("thumbs");
        config
    }

    #[test]
    fn test_init_writes_config_and_cache_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lumen").join("config.toml");
        let config = config_in(dir.path());

        init_at(&path, &config, false).unwrap();
        assert!(path.is_file());
        assert!(dir.path().join("thumbs").is_dir());

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[thumbnails]"));
    }

    #[test]
    fn test_init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine").unwrap();
        let config = config_in(dir.path());

        let err = init_at(&path, &config, false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");

        init_at(&path, &config, true).unwrap();
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "# mine");
    }
}
