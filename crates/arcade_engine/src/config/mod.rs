//! Configuration system
//!
//! Engine settings are plain serde structs. Any type implementing [`Config`]
//! can be loaded from or saved to TOML or RON, picked by file extension.

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::{Color, Vec2};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            Self::from_toml_str(&contents)
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Parse configuration from TOML text
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// # Engine Configuration
///
/// Settings shared by every scene: logging, broad-phase bucket size and
/// the logical display surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Width and height of a broad-phase collision bucket in world units
    pub bucket_size: [f32; 2],
    /// Logical display size in pixels
    pub display_size: [u32; 2],
    /// Color the first layers stage clears the display to
    pub clear_color: Color,
}

impl EngineConfig {
    /// Bucket size as a vector
    pub fn bucket_size(&self) -> Vec2 {
        Vec2::new(self.bucket_size[0], self.bucket_size[1])
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_size.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::Invalid {
                field: "bucket_size",
                reason: format!("{:?} must be positive and finite", self.bucket_size),
            });
        }
        if self.display_size.contains(&0) {
            return Err(ConfigError::Invalid {
                field: "display_size",
                reason: "display dimensions must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            bucket_size: [64.0, 64.0],
            display_size: [320, 240],
            clear_color: Color::BLACK,
        }
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bucket_size(), Vec2::new(64.0, 64.0));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("bucket_size = [32.0, 16.0]\n").unwrap();

        assert_eq!(config.bucket_size, [32.0, 16.0]);
        assert_eq!(config.display_size, [320, 240]);
    }

    #[test]
    fn test_rejects_zero_bucket() {
        let config = EngineConfig {
            bucket_size: [0.0, 10.0],
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "bucket_size", .. })
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::load_from_file("engine.yaml");
        assert!(result.is_err());
    }

    #[test]
    fn test_ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("arcade_engine_config_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();
        let config = EngineConfig {
            display_size: [640, 480],
            ..EngineConfig::default()
        };

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.display_size, [640, 480]);
    }
}
