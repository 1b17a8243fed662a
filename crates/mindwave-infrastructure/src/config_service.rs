//! Configuration loading.
//!
//! Resolution order: `MINDWAVE_BACKEND_URL` / `MINDWAVE_BACKEND_KEY`
//! environment variables first, then `~/.config/mindwave/config.toml`.
//! A missing backend section is not an error; the app runs local-only
//! with playback, journal, and custom trips but no remote persistence.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use mindwave_core::config::{BackendConfig, RootConfig};

use crate::paths::MindwavePaths;
use crate::storage::AtomicTomlFile;

const ENV_BACKEND_URL: &str = "MINDWAVE_BACKEND_URL";
const ENV_BACKEND_KEY: &str = "MINDWAVE_BACKEND_KEY";

/// Loads and caches the root configuration.
#[derive(Clone, Default)]
pub struct ConfigService {
    /// Lazily loaded on first access
    config: Arc<RwLock<Option<RootConfig>>>,
    /// Overrides the default file location, used by tests
    path_override: Option<PathBuf>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service reading from an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            path_override: Some(path),
        }
    }

    /// Gets the root configuration, loading it on first access.
    pub fn get_config(&self) -> RootConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = read_lock.as_ref() {
                return cached.clone();
            }
        }

        let loaded = self.load_config();

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(&self) -> RootConfig {
        let mut config = self.load_file().unwrap_or_default();
        apply_env(&mut config, |name| std::env::var(name).ok());
        if config.backend.is_none() {
            debug!("no backend configured, running local-only");
        }
        config
    }

    fn load_file(&self) -> Option<RootConfig> {
        let path = match &self.path_override {
            Some(path) => path.clone(),
            None => match MindwavePaths::config_file() {
                Ok(path) => path,
                Err(err) => {
                    warn!(error = %err, "cannot resolve config path");
                    return None;
                }
            },
        };

        match AtomicTomlFile::<RootConfig>::new(path).load() {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "failed to load config file, using defaults");
                None
            }
        }
    }
}

/// Applies environment overrides to a loaded configuration.
///
/// Both the URL and the key must be present to build a backend section
/// from scratch; with an existing section either variable overrides its
/// field independently.
fn apply_env<F>(config: &mut RootConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty());
    let key = lookup(ENV_BACKEND_KEY).filter(|v| !v.trim().is_empty());

    match config.backend.as_mut() {
        Some(backend) => {
            if let Some(url) = url {
                backend.url = url;
            }
            if let Some(key) = key {
                backend.anon_key = key;
            }
        }
        None => {
            if let (Some(url), Some(anon_key)) = (url, key) {
                config.backend = Some(BackendConfig {
                    url,
                    anon_key,
                    claim_timeout_secs: 5,
                    request_timeout_secs: 10,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn loads_backend_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [backend]
            url = "https://example.supabase.co"
            anon_key = "anon"
            "#,
        )
        .unwrap();

        let service = ConfigService::with_path(path);
        let config = service.get_config();
        let backend = config.backend.unwrap();
        assert_eq!(backend.url, "https://example.supabase.co");
        assert_eq!(backend.claim_timeout_secs, 5);
    }

    #[test]
    fn missing_file_is_local_only() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(dir.path().join("config.toml"));
        assert!(service.get_config().backend.is_none());
    }

    #[test]
    fn env_builds_backend_when_both_vars_present() {
        let mut config = RootConfig::default();
        apply_env(
            &mut config,
            env(&[
                (ENV_BACKEND_URL, "https://env.supabase.co"),
                (ENV_BACKEND_KEY, "env-key"),
            ]),
        );
        let backend = config.backend.unwrap();
        assert_eq!(backend.url, "https://env.supabase.co");
        assert_eq!(backend.anon_key, "env-key");
    }

    #[test]
    fn env_url_alone_does_not_build_backend() {
        let mut config = RootConfig::default();
        apply_env(&mut config, env(&[(ENV_BACKEND_URL, "https://env")]));
        assert!(config.backend.is_none());
    }

    #[test]
    fn env_overrides_file_values_independently() {
        let mut config = RootConfig {
            backend: Some(BackendConfig {
                url: "https://file.supabase.co".into(),
                anon_key: "file-key".into(),
                claim_timeout_secs: 5,
                request_timeout_secs: 10,
            }),
            ..Default::default()
        };
        apply_env(&mut config, env(&[(ENV_BACKEND_KEY, "env-key")]));
        let backend = config.backend.unwrap();
        assert_eq!(backend.url, "https://file.supabase.co");
        assert_eq!(backend.anon_key, "env-key");
    }

    #[test]
    fn cache_returns_same_config_until_invalidated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let service = ConfigService::with_path(path.clone());
        assert!(service.get_config().backend.is_none());

        fs::write(
            &path,
            r#"
            [backend]
            url = "https://late.supabase.co"
            anon_key = "anon"
            "#,
        )
        .unwrap();

        // Still cached.
        assert!(service.get_config().backend.is_none());
        service.invalidate_cache();
        assert!(service.get_config().backend.is_some());
    }
}
