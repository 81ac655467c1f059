//! Configuration file model
//!
//! The same schema is used for the project file (`ifjcode.toml`) and the
//! global file (`~/.ifjcode/config.toml`):
//!
//! ```toml
//! [run]
//! max_steps = 1000000
//! stats = true
//!
//! [trace]
//! level = "debug"
//! ```

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log levels accepted by `[trace] level`
pub const TRACE_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Contents of one configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Execution settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunSettings>,

    /// Logging settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceSettings>,
}

/// `[run]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    /// Stop after this many executed instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u64>,

    /// Print execution statistics after the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<bool>,
}

/// `[trace]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TraceSettings {
    /// Log level for the interpreter (`off`, `error`, ..., `trace`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl Settings {
    /// Load settings from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(0) = self.run.as_ref().and_then(|r| r.max_steps) {
            return Err(ConfigError::InvalidValue {
                field: "run.max_steps".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(level) = self.trace_level() {
            validate_trace_level("trace.level", level)?;
        }
        Ok(())
    }

    pub fn max_steps(&self) -> Option<u64> {
        self.run.as_ref().and_then(|r| r.max_steps)
    }

    pub fn stats(&self) -> Option<bool> {
        self.run.as_ref().and_then(|r| r.stats)
    }

    pub fn trace_level(&self) -> Option<&str> {
        self.trace.as_ref().and_then(|t| t.level.as_deref())
    }

    /// Merge another settings value into this one
    /// Other settings take precedence for non-None values
    pub fn merge(&mut self, other: &Settings) {
        if let Some(other_run) = &other.run {
            let run = self.run.get_or_insert_with(RunSettings::default);
            if other_run.max_steps.is_some() {
                run.max_steps = other_run.max_steps;
            }
            if other_run.stats.is_some() {
                run.stats = other_run.stats;
            }
        }
        if let Some(level) = other.trace_level() {
            self.trace
                .get_or_insert_with(TraceSettings::default)
                .level = Some(level.to_string());
        }
    }
}

/// Check a log level name
pub(crate) fn validate_trace_level(field: &str, level: &str) -> ConfigResult<()> {
    if !TRACE_LEVELS.contains(&level) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!(
                "must be one of {}, got '{}'",
                TRACE_LEVELS.join(", "),
                level
            ),
        });
    }
    Ok(())
}
