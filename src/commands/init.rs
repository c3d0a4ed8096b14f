//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Initialize curator: create the base directory and write a default
/// config file.
pub async fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<Config> {
    let base = base_dir.unwrap_or_else(Config::default_base_dir);
    let config_path = base.join("config.toml");

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Already initialized at {} (use --force to overwrite)",
            config_path.display()
        )));
    }

    std::fs::create_dir_all(&base)?;

    let mut config = Config::default();
    config.paths.base_dir = base.clone();
    config.paths.config_file = config_path;
    config.paths.chunks_file = base.join("chunks.jsonl");
    config.paths.embedded_file = base.join("embedded.jsonl");
    config.save()?;

    info!("Initialized curator at {}", base.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_config() {
        let tmp = TempDir::new().unwrap();

        let config = cmd_init(Some(tmp.path().to_path_buf()), false).await.unwrap();
        assert!(config.paths.config_file.exists());

        // A second init without --force refuses to clobber.
        let again = cmd_init(Some(tmp.path().to_path_buf()), false).await;
        assert!(again.is_err());

        // With --force it succeeds.
        assert!(cmd_init(Some(tmp.path().to_path_buf()), true).await.is_ok());
    }
}
