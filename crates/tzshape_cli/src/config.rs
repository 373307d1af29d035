//! Configuration management for the tzshape lookup tool.
//!
//! This module handles loading, validation, and conversion of the tool's
//! configuration from TOML files and command-line arguments.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use tzshape::{BoundingRegion, EngineConfig, IndexOptions};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where zone geometry comes from
    #[serde(default)]
    pub data: DataSettings,
    /// Rectangle of the world to index
    #[serde(default)]
    pub bounds: BoundsSettings,
    /// Index construction switches
    #[serde(default)]
    pub index: IndexOptions,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Dataset location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    /// GeoJSON dataset, plain or gzip-compressed. The bundled sample is used
    /// when unset.
    #[serde(default)]
    pub path: Option<String>,
}

/// Bounding region as raw numbers, validated by [`AppConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsSettings {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Default for BoundsSettings {
    fn default() -> Self {
        let world = BoundingRegion::world().bounds();
        Self {
            min_lat: world.min_lat,
            min_lon: world.min_lon,
            max_lat: world.max_lat,
            max_lon: world.max_lon,
        }
    }
}

impl BoundsSettings {
    /// Parses `MIN_LAT,MIN_LON,MAX_LAT,MAX_LON`.
    ///
    /// Only the shape is checked here; range checks happen in
    /// [`AppConfig::validate`] so every problem is reported together.
    pub fn parse(text: &str) -> Result<Self, String> {
        let values = text
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("'{}' is not a number", part.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            &[min_lat, min_lon, max_lat, max_lon] => Ok(Self {
                min_lat,
                min_lon,
                max_lat,
                max_lon,
            }),
            other => Err(format!(
                "expected MIN_LAT,MIN_LON,MAX_LAT,MAX_LON but got {} values",
                other.len()
            )),
        }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataSettings::default(),
            bounds: BoundsSettings::default(),
            index: IndexOptions::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file, creating a default file if none
    /// exists.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The loaded configuration, or an error if the file could not be read,
    /// parsed or created.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string listing
    /// every problem found.
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = BoundingRegion::violations(
            self.bounds.min_lat,
            self.bounds.min_lon,
            self.bounds.max_lat,
            self.bounds.max_lon,
        );

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            problems.push(format!("Invalid log level: {}", self.logging.level));
        }

        if let Some(path) = &self.data.path {
            if path.trim().is_empty() {
                problems.push("Data path cannot be empty".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    /// Converts the application configuration to an engine configuration.
    pub fn to_engine_config(&self) -> Result<EngineConfig, Box<dyn std::error::Error>> {
        let region = BoundingRegion::new(
            self.bounds.min_lat,
            self.bounds.min_lon,
            self.bounds.max_lat,
            self.bounds.max_lon,
        )?;

        Ok(EngineConfig {
            region,
            index: self.index.clone(),
        })
    }

    /// Dataset path, if one is configured.
    pub fn data_path(&self) -> Option<PathBuf> {
        self.data.path.as_ref().map(PathBuf::from)
    }
}
