//! Tiling configuration.
//!
//! ```rust
//! use quadtile::TilingConfig;
//!
//! let json = r#"{
//!     "projection": "linear_1280",
//!     "zl_coarse": 4,
//!     "zl_fine": 7
//! }"#;
//! let config = TilingConfig::from_json(json).unwrap();
//! assert_eq!(config.zl_fine, 7);
//! ```

use serde::de::Error;
use serde::{Deserialize, Serialize};

use crate::codec::MAX_ZOOM_LEVEL;
use crate::projection::Projection;

/// Zoom levels at or above this produce very large decompositions.
const DEEP_ZOOM_WARNING: u8 = 20;

/// Projection and zoom range used to decompose shapes into tiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilingConfig {
    /// Projection from world coordinates onto the tile grid
    #[serde(default)]
    pub projection: Projection,

    /// Coarsest zoom level at which interior tiles are emitted
    #[serde(default = "TilingConfig::default_zl_coarse")]
    pub zl_coarse: u8,

    /// Finest zoom level; shape edges are followed down to here
    #[serde(default = "TilingConfig::default_zl_fine")]
    pub zl_fine: u8,
}

impl TilingConfig {
    const fn default_zl_coarse() -> u8 {
        4
    }

    const fn default_zl_fine() -> u8 {
        12
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_zoom_range(mut self, zl_coarse: u8, zl_fine: u8) -> Self {
        self.zl_coarse = zl_coarse;
        self.zl_fine = zl_fine;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.zl_fine > MAX_ZOOM_LEVEL {
            return Err(format!(
                "Fine zoom level must be at most {MAX_ZOOM_LEVEL}, got {}",
                self.zl_fine
            ));
        }
        if self.zl_coarse > self.zl_fine {
            return Err(format!(
                "Coarse zoom level ({}) must not exceed fine zoom level ({})",
                self.zl_coarse, self.zl_fine
            ));
        }
        if let Err(e) = self.projection.validate() {
            return Err(e.to_string());
        }
        if self.zl_fine >= DEEP_ZOOM_WARNING {
            log::warn!(
                "Fine zoom level {} may produce very large decompositions",
                self.zl_fine
            );
        }
        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: TilingConfig = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: TilingConfig = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            zl_coarse: Self::default_zl_coarse(),
            zl_fine: Self::default_zl_fine(),
        }
    }
}
