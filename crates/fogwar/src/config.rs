use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TILE_SIZE: f32 = 64.0;
pub const DEFAULT_VISIBILITY_RANGE: f32 = 3.0;
pub const MAX_VISIBILITY_RANGE: f32 = 256.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    pub tile_size: f32,
    pub visibility_range: f32,
    pub use_line_of_sight: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            visibility_range: DEFAULT_VISIBILITY_RANGE,
            use_line_of_sight: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("tile_size must be finite and greater than zero, got {0}")]
    InvalidTileSize(f32),
    #[error("visibility_range must be finite and within 0..={max}, got {value}")]
    InvalidVisibilityRange { value: f32, max: f32 },
}

impl VisibilityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tile_size(self.tile_size)?;
        validate_visibility_range(self.visibility_range)?;
        Ok(())
    }
}

pub(crate) fn validate_tile_size(tile_size: f32) -> Result<(), ConfigError> {
    if !tile_size.is_finite() || tile_size <= 0.0 {
        return Err(ConfigError::InvalidTileSize(tile_size));
    }
    Ok(())
}

pub(crate) fn validate_visibility_range(range: f32) -> Result<(), ConfigError> {
    if !range.is_finite() || !(0.0..=MAX_VISIBILITY_RANGE).contains(&range) {
        return Err(ConfigError::InvalidVisibilityRange {
            value: range,
            max: MAX_VISIBILITY_RANGE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = VisibilityConfig::default();
        assert_eq!(config.tile_size, 64.0);
        assert_eq!(config.visibility_range, 3.0);
        assert!(config.use_line_of_sight);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_or_non_finite_tile_size() {
        for tile_size in [0.0, -4.0, f32::NAN, f32::INFINITY] {
            let config = VisibilityConfig {
                tile_size,
                ..VisibilityConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidTileSize(_))),
                "tile_size {tile_size} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_visibility() {
        for visibility_range in [-0.5, f32::NAN, MAX_VISIBILITY_RANGE + 1.0] {
            let config = VisibilityConfig {
                visibility_range,
                ..VisibilityConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidVisibilityRange { .. })
            ));
        }
    }

    #[test]
    fn zero_visibility_range_is_allowed() {
        let config = VisibilityConfig {
            visibility_range: 0.0,
            ..VisibilityConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: VisibilityConfig =
            serde_json::from_str(r#"{"visibility_range": 5.5}"#).expect("parse config");
        assert_eq!(config.visibility_range, 5.5);
        assert_eq!(config.tile_size, DEFAULT_TILE_SIZE);
        assert!(config.use_line_of_sight);
    }
}
