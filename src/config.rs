//! Configuration for the circadia dashboard core.

use crate::dataset::store::DatasetSources;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration: where the four dataset sources live and where
/// exports go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the four CSV sources
    pub data_dir: PathBuf,

    /// File name of the female activity table
    pub female_activity: String,

    /// File name of the female temperature table
    pub female_temperature: String,

    /// File name of the male activity table
    pub male_activity: String,

    /// File name of the male temperature table
    pub male_temperature: String,

    /// Path for exported chart payloads
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let export_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("circadia")
            .join("exports");

        Self {
            data_dir: PathBuf::from("data"),
            female_activity: "Fem_Act.csv".to_string(),
            female_temperature: "Fem_Temp.csv".to_string(),
            male_activity: "Male_Act.csv".to_string(),
            male_temperature: "Male_Temp.csv".to_string(),
            export_path: export_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("circadia")
            .join("config.json")
    }

    /// Ensure the export directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Paths of the four dataset sources.
    pub fn sources(&self) -> DatasetSources {
        DatasetSources {
            female_activity: self.data_dir.join(&self.female_activity),
            female_temperature: self.data_dir.join(&self.female_temperature),
            male_activity: self.data_dir.join(&self.male_activity),
            male_temperature: self.data_dir.join(&self.male_temperature),
        }
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.female_activity, "Fem_Act.csv");
        assert_eq!(config.male_temperature, "Male_Temp.csv");
    }

    #[test]
    fn test_sources_join_data_dir() {
        let config = Config {
            data_dir: PathBuf::from("/srv/circadia"),
            ..Config::default()
        };

        let sources = config.sources();
        assert_eq!(
            sources.female_activity,
            PathBuf::from("/srv/circadia/Fem_Act.csv")
        );
        assert_eq!(
            sources.male_activity,
            PathBuf::from("/srv/circadia/Male_Act.csv")
        );
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: Config = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.female_temperature, config.female_temperature);
    }
}
