// src/config/loader.rs
//! Layered configuration loader: defaults, TOML files, then environment

use crate::config::constants::paths;
use crate::config::AcquisitionConfig;
use ::config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration source error: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("configuration serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Configuration loader merging every source into one store
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader reading the default file locations and `EGD__*` variables
    pub fn new() -> Self {
        Self {
            config_paths: paths::DEFAULT_CONFIG_FILES.iter().map(PathBuf::from).collect(),
            env_prefix: Some(paths::ENV_PREFIX.to_string()),
        }
    }

    /// Create loader with custom paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: Some(paths::ENV_PREFIX.to_string()),
        }
    }

    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Ignore environment variables
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Merged key/value store; also usable as a parameter source
    pub fn build_store(&self) -> Result<Config, ConfigError> {
        let defaults = Config::try_from(&AcquisitionConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        for path in &self.config_paths {
            builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml).required(false));
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator(paths::ENV_SEPARATOR)
                    .separator(paths::ENV_SEPARATOR)
                    .try_parsing(true),
            );
        }

        Ok(builder.build()?)
    }

    /// Load and validate the acquisition configuration
    pub fn load(&self) -> Result<AcquisitionConfig, ConfigError> {
        let config: AcquisitionConfig = self.build_store()?.try_deserialize()?;
        config.validate_consistency().map_err(ConfigError::Validation)?;
        tracing::debug!(
            files = ?self.config_paths,
            devarg = %config.device.devarg,
            framerate = config.framerate,
            "acquisition configuration loaded"
        );
        Ok(config)
    }

    /// Export a configuration to a TOML file
    pub fn export<P: AsRef<Path>>(config: &AcquisitionConfig, path: P) -> Result<(), ConfigError> {
        let toml_content = toml::to_string_pretty(config)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }
}
