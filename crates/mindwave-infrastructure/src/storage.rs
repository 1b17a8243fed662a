//! Atomic TOML file operations.
//!
//! Thin layer for safe access to TOML files on disk. Writes go through a
//! temporary file in the same directory, fsync, then an atomic rename, so
//! a crash mid-save never leaves a truncated file behind. Concurrency is
//! the caller's concern: the state repository serializes access behind a
//! single mutex.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};

use mindwave_core::error::{MindwaveError, Result};

/// A handle to a TOML file with atomic save semantics.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: loaded and parsed
    /// - `Ok(None)`: the file does not exist or is empty
    /// - `Err`: the file exists but could not be read or parsed
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = toml::from_str(&content)?;
        Ok(Some(data))
    }

    /// Saves the data atomically via tmp file + fsync + rename.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| MindwaveError::config("state path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| MindwaveError::config("state path has no file name"))?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}
