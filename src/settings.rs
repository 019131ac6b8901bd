//! Blur Settings
//!
//! Serializable configuration for a [`GaussianBlurFilter`]. Settings can be
//! built in code or loaded from JSON, validated once, then turned into a
//! filter.
//!
//! ```rust,ignore
//! use myth_blur::{BlurSettings, TileMode};
//!
//! let settings = BlurSettings::from_json(r#"{ "sigma_x": 8.0, "sigma_y": 2.0 }"#)?;
//! let filter = settings.into_filter()?;
//!
//! let glow = BlurSettings {
//!     tile_mode: TileMode::Clamp,
//!     ..BlurSettings::uniform(12.0)
//! };
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{BlurError, Result};
use crate::filter::GaussianBlurFilter;
use crate::sampler::TileMode;

/// Blur strength per axis and the tiling policy.
///
/// Missing fields fall back to [`Default`]: no blur, decal tiling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurSettings {
    /// Horizontal standard deviation in local pixels.
    pub sigma_x: f32,
    /// Vertical standard deviation in local pixels.
    pub sigma_y: f32,
    pub tile_mode: TileMode,
}

impl BlurSettings {
    /// Same sigma on both axes.
    #[must_use]
    pub fn uniform(sigma: f32) -> Self {
        Self {
            sigma_x: sigma,
            sigma_y: sigma,
            ..Default::default()
        }
    }

    /// Parses settings from JSON and validates them.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects negative, NaN or infinite sigmas.
    pub fn validate(&self) -> Result<()> {
        for sigma in [self.sigma_x, self.sigma_y] {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(BlurError::InvalidSigma(sigma));
            }
        }
        Ok(())
    }

    /// Validates and builds the filter.
    pub fn into_filter(self) -> Result<GaussianBlurFilter> {
        self.validate()?;
        Ok(GaussianBlurFilter::new(self.sigma_x, self.sigma_y, self.tile_mode))
    }
}
