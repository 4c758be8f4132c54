//! # nwbqc-config
//!
//! Layered configuration loading for nwbqc using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`NWBQC_*` prefix, `__` as separator)
//! 2. Project-level `nwbqc.toml`
//! 3. User-level `~/.config/nwbqc/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `NWBQC_PATHS__SCRATCH_DIR` -> `paths.scratch_dir`,
//! `NWBQC_BATCH__JOBS` -> `batch.jobs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use nwbqc_config::QcConfig;
//!
//! let config = QcConfig::load_with_dotenv().expect("config");
//! println!("scratch root: {}", config.paths.scratch_dir);
//! ```

mod batch;
mod error;
mod paths;

pub use batch::{BatchConfig, ReportConfig};
pub use error::ConfigError;
pub use paths::PathsConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QcConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl QcConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration after reading a `.env` file from the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate a config from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from("nwbqc.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("NWBQC_").split("__"))
    }

    /// Reject values that would make a batch run unsafe.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty scratch or output directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.scratch_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "paths.scratch_dir".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.paths.output_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "paths.output_dir".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nwbqc").join("config.toml"))
    }
}
