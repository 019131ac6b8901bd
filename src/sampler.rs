//! Sampler Descriptions & Tile Modes
//!
//! Backend-agnostic sampler state. A [`SamplerDescriptor`] is a plain
//! hashable value: backends use it directly as a cache key when acquiring
//! the matching GPU sampler.

use serde::{Deserialize, Serialize};

use crate::subpass::DeviceCapabilities;

/// How a filter samples outside its input's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileMode {
    /// Repeat the edge texel.
    Clamp,
    /// Wrap around to the opposite edge.
    Repeat,
    /// Reflect at each edge.
    Mirror,
    /// Treat everything outside as transparent black.
    #[default]
    Decal,
}

/// Texel filtering for minification and magnification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MinMagFilter {
    #[default]
    Nearest,
    Linear,
}

/// Per-axis addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplerAddressMode {
    #[default]
    ClampToEdge,
    Repeat,
    Mirror,
    /// Transparent black outside `[0, 1]`. Requires device support.
    Decal,
}

/// Complete sampler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerDescriptor {
    pub min_filter: MinMagFilter,
    pub mag_filter: MinMagFilter,
    pub width_address_mode: SamplerAddressMode,
    pub height_address_mode: SamplerAddressMode,
}

impl SamplerDescriptor {
    #[must_use]
    pub const fn new(filter: MinMagFilter, address_mode: SamplerAddressMode) -> Self {
        Self {
            min_filter: filter,
            mag_filter: filter,
            width_address_mode: address_mode,
            height_address_mode: address_mode,
        }
    }

    /// Linear filtering, clamp-to-edge on both axes.
    #[must_use]
    pub const fn linear_clamp() -> Self {
        Self::new(MinMagFilter::Linear, SamplerAddressMode::ClampToEdge)
    }

    /// Same addressing, both filters replaced.
    #[must_use]
    pub const fn with_filter(mut self, filter: MinMagFilter) -> Self {
        self.min_filter = filter;
        self.mag_filter = filter;
        self
    }

    #[must_use]
    pub const fn with_address_mode(mut self, address_mode: SamplerAddressMode) -> Self {
        self.width_address_mode = address_mode;
        self.height_address_mode = address_mode;
        self
    }

    /// Applies `tile_mode` to both axes.
    ///
    /// `Decal` is only honoured when the device supports decal addressing;
    /// otherwise it falls back to clamp-to-edge.
    #[must_use]
    pub fn with_tile_mode(self, tile_mode: TileMode, capabilities: DeviceCapabilities) -> Self {
        match tile_mode {
            TileMode::Decal if capabilities.supports_decal_sampler_address_mode => {
                self.with_address_mode(SamplerAddressMode::Decal)
            }
            TileMode::Decal | TileMode::Clamp => {
                self.with_address_mode(SamplerAddressMode::ClampToEdge)
            }
            TileMode::Mirror => self.with_address_mode(SamplerAddressMode::Mirror),
            TileMode::Repeat => self.with_address_mode(SamplerAddressMode::Repeat),
        }
    }
}
