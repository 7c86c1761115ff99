//! Configuration for the Alcove runner
//!
//! Handles loading and validating runner configuration.

use std::path::Path;

use alcove_core::error::{Error, IsolationError, Result};
use alcove_core::LogLevel;
use alcove_isolation::{ModulePackage, DEFAULT_MAX_RETRIES};
use alcove_module::{INTERFACE_IMAGE, MODULE_IMAGE, MODULE_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::resolver::StrategyKind;

/// Module package configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
    /// The image loaded first into every context
    #[serde(default = "default_entry")]
    pub entry: String,

    /// Every image shipped with the module
    #[serde(default = "default_images")]
    pub images: Vec<String>,
}

fn default_entry() -> String {
    MODULE_IMAGE.to_string()
}

fn default_images() -> Vec<String> {
    vec![MODULE_IMAGE.to_string()]
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            images: default_images(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level, unless `RUST_LOG` says otherwise
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON instead of plain text
    #[serde(default)]
    pub json: bool,
}

/// Runner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Sweep budget of the liveness probe
    #[serde(default = "default_max_probe_retries")]
    pub max_probe_retries: usize,

    /// Name of the module's entry type
    #[serde(default = "default_module_type")]
    pub module_type: String,

    /// Strategies to run, in order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyKind>,

    /// The module package
    #[serde(default)]
    pub package: PackageConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_max_probe_retries() -> usize {
    DEFAULT_MAX_RETRIES
}

fn default_module_type() -> String {
    MODULE_TYPE.to_string()
}

fn default_strategies() -> Vec<StrategyKind> {
    StrategyKind::ALL.to_vec()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_probe_retries: default_max_probe_retries(),
            module_type: default_module_type(),
            strategies: default_strategies(),
            package: PackageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a file
    ///
    /// A missing file is not an error: the defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());

                if !path.exists() {
                    warn!("Configuration file not found: {}", path.display());
                    return Ok(Self::default());
                }

                let content = std::fs::read_to_string(path)?;
                Self::from_toml_str(&content)?
            }
            None => {
                info!("No configuration file specified, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize configuration: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_probe_retries == 0 {
            return Err(Error::Config("Probe retries cannot be zero".to_string()));
        }

        if self.module_type.is_empty() {
            return Err(Error::Config("Module type cannot be empty".to_string()));
        }

        if self.package.entry.is_empty() {
            return Err(Error::Config("Package entry cannot be empty".to_string()));
        }

        if !self.package.images.contains(&self.package.entry) {
            return Err(Error::Config(format!(
                "Package entry '{}' is not among the shipped images",
                self.package.entry
            )));
        }

        if self.strategies.is_empty() {
            return Err(Error::Config("At least one strategy is required".to_string()));
        }

        if self.ships_interface() {
            warn!(
                "The module package ships '{}'; module types will not match the host's capabilities",
                INTERFACE_IMAGE
            );
        }

        Ok(())
    }

    /// Whether the package ships its own copy of the interface image
    pub fn ships_interface(&self) -> bool {
        self.package.images.iter().any(|image| image == INTERFACE_IMAGE)
    }

    /// Add the interface image to the package
    pub fn ship_interface(&mut self) {
        if !self.ships_interface() {
            self.package.images.push(INTERFACE_IMAGE.to_string());
        }
    }

    /// Build the module package from the built-in image catalog
    pub fn build_package(&self) -> Result<ModulePackage> {
        let images = self
            .package
            .images
            .iter()
            .map(|name| {
                alcove_module::image(name)
                    .ok_or_else(|| Error::from(IsolationError::ImageNotFound(name.clone())))
            })
            .collect::<Result<Vec<_>>>()?;
        ModulePackage::new(self.package.entry.clone(), images)
    }
}
