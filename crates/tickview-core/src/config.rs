//! YAML loading and shared configuration values.

use crate::color::Color;
use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A color as written in configuration: packed `0xAARRGGBB` or a hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Packed ARGB integer
    Packed(u32),
    /// `#RRGGBB` or `#RRGGBBAA`
    Hex(String),
}

impl ColorSpec {
    /// Resolve to a [`Color`].
    pub fn resolve(&self) -> Result<Color, ConfigError> {
        match self {
            Self::Packed(argb) => Ok(Color::from_argb(*argb)),
            Self::Hex(hex) => Color::from_hex(hex).map_err(|source| ConfigError::InvalidColor {
                value: hex.clone(),
                source,
            }),
        }
    }
}

impl From<Color> for ColorSpec {
    fn from(color: Color) -> Self {
        Self::Packed(color.to_argb())
    }
}

/// Parse a config record from YAML text.
pub fn from_yaml_str<T: DeserializeOwned>(yaml: &str) -> Result<T, ConfigError> {
    Ok(serde_yaml_ng::from_str(yaml)?)
}

/// Read and parse a config record from a YAML file.
pub fn from_yaml_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    from_yaml_str(&text)
}

/// Reject zero for a field that must be strictly positive.
pub fn require_positive(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::invalid(field, "must be greater than zero"))
    } else {
        Ok(())
    }
}
