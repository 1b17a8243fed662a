//! Path resolution for mindwave files.
//!
//! All persisted data lives under the platform config directory:
//!
//! ```text
//! ~/.config/mindwave/
//! ├── config.toml   # application configuration
//! ├── state.toml    # durable user state (journal, custom trips, mirror)
//! └── logs/
//! ```

use std::path::PathBuf;

use mindwave_core::error::{MindwaveError, Result};

/// Unified path management for mindwave.
pub struct MindwavePaths;

impl MindwavePaths {
    /// Returns the mindwave configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.config/mindwave/`
    /// - `Err`: the platform config directory could not be determined
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("mindwave"))
            .ok_or_else(|| MindwaveError::config("cannot find config directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the durable state file.
    pub fn state_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("state.toml"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_ends_with_app_name() {
        let config_dir = MindwavePaths::config_dir().unwrap();
        assert!(config_dir.ends_with("mindwave"));
    }

    #[test]
    fn files_live_under_config_dir() {
        let config_dir = MindwavePaths::config_dir().unwrap();
        assert!(MindwavePaths::config_file().unwrap().starts_with(&config_dir));
        assert!(MindwavePaths::state_file().unwrap().starts_with(&config_dir));
        assert!(MindwavePaths::logs_dir().unwrap().starts_with(&config_dir));
    }

    #[test]
    fn file_names() {
        assert!(MindwavePaths::config_file().unwrap().ends_with("config.toml"));
        assert!(MindwavePaths::state_file().unwrap().ends_with("state.toml"));
    }
}
