//! IFJcode Configuration System
//!
//! Provides configuration for the `ifjcode` interpreter:
//! - Project configuration (ifjcode.toml)
//! - Global user configuration (~/.ifjcode/config.toml)
//! - Environment variable overrides
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.ifjcode/config.toml)
//! 2. Project config (./ifjcode.toml, searched upward)
//! 3. Environment variables (IFJCODE_*)
//! 4. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use ifjcode_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("step limit: {:?}", config.max_steps());
//! ```

pub mod loader;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "ifjcode.toml";

// Re-export main types
pub use loader::{Config, ConfigLoader};
pub use settings::{RunSettings, Settings, TraceSettings};
