//! Init command - write the default configuration and directory layout

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Execute init - create the config file and data directories.
pub fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<Config> {
    let mut config = Config::default();
    config.init_paths(base_dir);

    if config.paths.config_file.exists() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.config_file.display().to_string(),
        ));
    }

    config.save()?;
    std::fs::create_dir_all(&config.paths.snapshots_dir)?;
    std::fs::create_dir_all(&config.paths.reports_dir)?;
    std::fs::create_dir_all(&config.paths.summaries_dir)?;

    info!("Initialized driftwatch at {:?}", config.paths.base_dir);
    Ok(config)
}

/// Print the initialized layout to console
pub fn print_init(config: &Config) {
    println!("Initialized driftwatch\n");
    println!("Config:    {}", config.paths.config_file.display());
    println!("Snapshots: {}", config.paths.snapshots_dir.display());
    println!("Reports:   {}", config.paths.reports_dir.display());
    println!("Summaries: {}", config.paths.summaries_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let config = cmd_init(Some(tmp.path().to_path_buf()), false).unwrap();

        assert!(config.paths.config_file.exists());
        assert!(config.paths.snapshots_dir.exists());
        assert!(config.paths.summaries_dir.exists());
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        cmd_init(Some(tmp.path().to_path_buf()), false).unwrap();

        let err = cmd_init(Some(tmp.path().to_path_buf()), false).unwrap_err();
        assert!(matches!(err, Error::AlreadyInitialized(_)));

        assert!(cmd_init(Some(tmp.path().to_path_buf()), true).is_ok());
    }
}
