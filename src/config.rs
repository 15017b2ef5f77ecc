//! Application directories
//!
//! Nothing is persisted between sessions; the only file framestep writes is
//! its optional log. This resolves where that goes.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory
pub const CONFIG_DIR_ENV: &str = "FRAMESTEP_CONFIG_DIR";

/// Default log file name for `--log` without a path
pub const LOG_FILE_NAME: &str = "framestep.log";

const APP_DIR_NAME: &str = "framestep";

/// Directory overrides from CLI and environment
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI arg → FRAMESTEP_CONFIG_DIR → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from));
        Self { config_dir }
    }

    /// Data directory:
    /// 1. `--config-dir` / `FRAMESTEP_CONFIG_DIR`
    /// 2. Current folder if it already holds `framestep.log`
    /// 3. Platform data directory (`~/.local/share/framestep` on Linux)
    pub fn data_dir(&self) -> PathBuf {
        let cwd = std::env::current_dir().ok();
        self.resolve_data_dir(cwd.as_deref())
    }

    fn resolve_data_dir(&self, cwd: Option<&Path>) -> PathBuf {
        if let Some(dir) = &self.config_dir {
            return dir.clone();
        }

        if let Some(cwd) = cwd
            && cwd.join(LOG_FILE_NAME).exists()
        {
            return cwd.to_path_buf();
        }

        if let Some(dir) = dirs_next::data_dir() {
            return dir.join(APP_DIR_NAME);
        }

        PathBuf::from(".")
    }

    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir().join(name)
    }

    /// Default log path
    pub fn log_file(&self) -> PathBuf {
        self.data_file(LOG_FILE_NAME)
    }

    /// Create the data directory if missing
    pub fn ensure_dirs(&self) -> Result<()> {
        let dir = self.data_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_dir_wins() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/custom")));
        assert_eq!(config.log_file(), PathBuf::from("/custom/framestep.log"));
        assert_eq!(config.data_file("x.txt"), PathBuf::from("/custom/x.txt"));
    }

    #[test]
    fn test_platform_default() {
        let config = PathConfig { config_dir: None };
        let dir = config.resolve_data_dir(None);
        assert!(dir.to_string_lossy().contains("framestep") || dir == PathBuf::from("."));
    }

    #[test]
    fn test_local_log_file_priority() {
        let temp_dir = std::env::temp_dir().join("framestep_test_local");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let _ = std::fs::remove_file(temp_dir.join(LOG_FILE_NAME));

        let config = PathConfig { config_dir: None };
        assert_ne!(config.resolve_data_dir(Some(&temp_dir)), temp_dir);

        std::fs::write(temp_dir.join(LOG_FILE_NAME), "").unwrap();
        assert_eq!(config.resolve_data_dir(Some(&temp_dir)), temp_dir);

        let _ = std::fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_ensure_dirs_creates() {
        let dir = std::env::temp_dir().join("framestep_test_ensure").join("nested");
        let _ = std::fs::remove_dir_all(&dir);
        let config = PathConfig {
            config_dir: Some(dir.clone()),
        };
        config.ensure_dirs().unwrap();
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }
}
