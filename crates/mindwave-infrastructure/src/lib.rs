//! Infrastructure: file persistence and configuration loading.
//!
//! Everything here touches the filesystem. The durable user state lives in
//! a single TOML file under the platform config directory, written
//! atomically; configuration is resolved from environment variables first
//! and `config.toml` second.

pub mod config_service;
pub mod paths;
pub mod state_repository;
pub mod storage;

pub use config_service::ConfigService;
pub use paths::MindwavePaths;
pub use state_repository::TomlStateRepository;
