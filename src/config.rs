//! Configuration System
//!
//! Layered configuration: built-in defaults, then the global config file, then an
//! explicit file, then `RNGR__*` environment variables. Loaded once at startup and
//! immutable afterwards.

use crate::error::ApiError;
use crate::generator::GenerationConfig;
use crate::jobs::SchedulerConfig;
use crate::limits::Limits;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use sources::{global_config_path, ENV_PREFIX};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RngrConfig {
    /// Request limits
    #[serde(default)]
    pub limits: Limits,

    /// Worker pool
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Generation tuning and weight defaults
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Limits(String),
    Scheduler(String),
    Generation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Limits(msg) => write!(f, "Limits: {}", msg),
            ValidationError::Scheduler(msg) => write!(f, "Scheduler: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RngrConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if let Err(e) = self.limits.validate() {
            errors.push(ValidationError::Limits(e));
        }
        if let Err(e) = self.scheduler.validate() {
            errors.push(ValidationError::Scheduler(e));
        }
        if let Err(e) = self.generation.validate() {
            errors.push(ValidationError::Generation(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`RngrConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Built-in defaults only
    pub fn default() -> RngrConfig {
        RngrConfig::default()
    }

    /// Load from defaults, the global file, `explicit` (if given) and the environment.
    pub fn load(explicit: Option<&Path>) -> Result<RngrConfig, ApiError> {
        let mut builder = merge::builder_with_defaults()?;
        builder = sources::add_global_file(builder)?;
        if let Some(path) = explicit {
            builder = sources::add_explicit_file(builder, path)?;
        }
        builder = sources::add_environment(builder);
        Self::finish(builder.build()?)
    }

    /// Load from defaults and a single file, ignoring the global file and environment.
    pub fn load_from_file(path: &Path) -> Result<RngrConfig, ApiError> {
        let builder = sources::add_explicit_file(merge::builder_with_defaults()?, path)?;
        Self::finish(builder.build()?)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_config_path()
    }

    fn finish(config: config::Config) -> Result<RngrConfig, ApiError> {
        let config: RngrConfig = config.try_deserialize()?;
        config.validate().map_err(|errors| {
            ApiError::ConfigError(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(config)
    }
}
