//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::settings::{validate_trace_level, Settings};
use crate::{ConfigError, ConfigResult, CONFIG_FILE_NAME};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding `run.max_steps`
pub const ENV_MAX_STEPS: &str = "IFJCODE_MAX_STEPS";
/// Environment variable overriding `run.stats`
pub const ENV_STATS: &str = "IFJCODE_STATS";
/// Environment variable overriding `trace.level`
pub const ENV_TRACE: &str = "IFJCODE_TRACE";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.ifjcode/config.toml) - lowest priority
/// 2. Project config (./ifjcode.toml) - overrides global
/// 3. Environment variables (IFJCODE_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Global config path; `None` until first resolved
    global_config_path: Option<PathBuf>,
    /// Skip the global config entirely
    skip_global: bool,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Effective settings after merging every source
    pub settings: Settings,

    /// Directory where ifjcode.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
            skip_global: false,
        }
    }

    /// Use `path` as the global config file instead of ~/.ifjcode/config.toml
    pub fn with_global_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Ignore the global config file
    pub fn without_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find ifjcode.toml, merges it over the
    /// global config and applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project) = find_project_settings(start_dir)?;
        self.assemble(project, project_root)
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project = Settings::load_from_file(config_path)?;
        let project_root = config_path.parent().map(|p| p.to_path_buf());
        self.assemble(project, project_root)
    }

    fn assemble(&mut self, project: Settings, project_root: Option<PathBuf>) -> ConfigResult<Config> {
        let mut settings = self.load_global_config()?;
        settings.merge(&project);
        apply_env_overrides(&mut settings)?;

        Ok(Config {
            settings,
            project_root,
        })
    }

    /// Load global configuration from ~/.ifjcode/config.toml
    fn load_global_config(&mut self) -> ConfigResult<Settings> {
        if self.skip_global {
            return Ok(Settings::default());
        }

        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match Self::global_config_dir() {
                Ok(dir) => {
                    let path = dir.join("config.toml");
                    self.global_config_path = Some(path.clone());
                    path
                }
                // No home directory: nothing global to load
                Err(ConfigError::HomeNotFound) => return Ok(Settings::default()),
                Err(e) => return Err(e),
            },
        };

        // Global config is optional - if it doesn't exist, return default
        if !path.exists() {
            return Ok(Settings::default());
        }

        Settings::load_from_file(&path)
    }

    /// Get the global configuration directory (~/.ifjcode)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".ifjcode"))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Find project settings by walking up the directory tree
///
/// Returns (project_root, settings); defaults when no file is found.
fn find_project_settings(start_dir: &Path) -> ConfigResult<(Option<PathBuf>, Settings)> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let settings = Settings::load_from_file(&config_path)?;
            return Ok((Some(current), settings));
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Ok((None, Settings::default())),
        }
    }
}

/// Apply IFJCODE_* environment variable overrides
fn apply_env_overrides(settings: &mut Settings) -> ConfigResult<()> {
    let mut overrides = Settings::default();

    if let Ok(value) = env::var(ENV_MAX_STEPS) {
        let max_steps = value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: ENV_MAX_STEPS.to_string(),
                reason: format!("expected a positive integer, got '{}'", value),
            })?;
        overrides.run.get_or_insert_with(Default::default).max_steps = Some(max_steps);
    }

    if let Ok(value) = env::var(ENV_STATS) {
        let stats = matches!(value.to_lowercase().as_str(), "true" | "1" | "yes");
        overrides.run.get_or_insert_with(Default::default).stats = Some(stats);
    }

    if let Ok(level) = env::var(ENV_TRACE) {
        let level = level.trim().to_lowercase();
        validate_trace_level(ENV_TRACE, &level)?;
        overrides.trace.get_or_insert_with(Default::default).level = Some(level);
    }

    settings.merge(&overrides);
    Ok(())
}

impl Config {
    /// Step limit, if any
    pub fn max_steps(&self) -> Option<u64> {
        self.settings.max_steps()
    }

    /// Whether statistics are printed (default: false)
    pub fn stats(&self) -> bool {
        self.settings.stats().unwrap_or(false)
    }

    /// Interpreter log level, if configured
    pub fn trace_level(&self) -> Option<&str> {
        self.settings.trace_level()
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if an ifjcode.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}
