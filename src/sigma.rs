//! Sigma Model
//!
//! Pure functions that turn a requested blur strength into the numbers the
//! GPU passes work with:
//!
//! | Function | Maps | Used for |
//! |----------|------|----------|
//! | [`scale_sigma`] | requested σ → rendered σ | everything below |
//! | [`calculate_blur_radius`] | σ → pixel radius | coverage, padding, shader sample count |
//! | [`calculate_scale`] | σ → downsample factor | subpass resolution |
//!
//! The scaling curve is an empirical fit, not a literal convolution model: it
//! leaves small sigmas untouched and progressively shrinks large ones so the
//! kernel never exceeds roughly 1000×1000 pixels.

use glam::Vec2;

/// Pixels of kernel radius per unit of sigma (√3).
pub const KERNEL_RADIUS_PER_SIGMA: f32 = 1.732_050_8;

/// Requested sigmas are clamped to this value before scaling.
pub const MAX_SIGMA: f32 = 500.0;

/// Sigmas below this are treated as "no blur" along that axis.
pub const BLUR_EPSILON: f32 = 1e-3;

/// Sigma at or below which no downsampling happens.
pub const DOWNSAMPLE_THRESHOLD: f32 = 4.0;

// Quadratic multiplier `1 + b·σ + a·σ²`: equals 1 at σ = 0 with its minimum
// at σ = MAX_SIGMA (-b / 2a = 500).
const SCALE_A: f32 = 3.4e-6;
const SCALE_B: f32 = -3.4e-3;
const SCALE_C: f32 = 1.0;

/// Gaussian standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Sigma(pub f32);

/// Kernel radius in pixels beyond which samples are ignored.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Radius(pub f32);

impl From<Sigma> for Radius {
    fn from(sigma: Sigma) -> Self {
        if sigma.0 > 0.5 {
            Self((sigma.0 - 0.5) * KERNEL_RADIUS_PER_SIGMA)
        } else {
            Self(0.0)
        }
    }
}

impl From<Radius> for Sigma {
    fn from(radius: Radius) -> Self {
        if radius.0 > 0.0 {
            Self(radius.0 / KERNEL_RADIUS_PER_SIGMA + 0.5)
        } else {
            Self(0.0)
        }
    }
}

/// Clamps `sigma` to `[0, MAX_SIGMA]` and applies the perceptual falloff curve.
///
/// NaN is treated as zero.
#[must_use]
pub fn scale_sigma(sigma: f32) -> f32 {
    let clamped = sigma.max(0.0).min(MAX_SIGMA);
    let scalar = SCALE_C + SCALE_B * clamped + SCALE_A * clamped * clamped;
    clamped * scalar
}

/// Pixel radius for a (scaled) sigma.
#[must_use]
pub fn calculate_blur_radius(sigma: f32) -> f32 {
    Radius::from(Sigma(sigma)).0
}

/// Downsample factor for one axis: `1` up to σ = 4, then `4 / σ`.
#[must_use]
pub fn calculate_scale(sigma: f32) -> f32 {
    if sigma <= DOWNSAMPLE_THRESHOLD {
        return 1.0;
    }
    DOWNSAMPLE_THRESHOLD / sigma
}

/// Per-axis values derived from a requested `(sigma_x, sigma_y)` pair.
///
/// Recomputed on every call; nothing here is cached between renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurExtent {
    /// Sigma after [`scale_sigma`].
    pub scaled_sigma: Vec2,
    /// Radius for the scaled sigma.
    pub blur_radius: Vec2,
    /// Transparent gutter in source pixels: `ceil(blur_radius)`.
    pub padding: Vec2,
}

impl BlurExtent {
    #[must_use]
    pub fn new(sigma_x: f32, sigma_y: f32) -> Self {
        let scaled_sigma = Vec2::new(scale_sigma(sigma_x), scale_sigma(sigma_y));
        let blur_radius = Vec2::new(
            calculate_blur_radius(scaled_sigma.x),
            calculate_blur_radius(scaled_sigma.y),
        );
        Self {
            scaled_sigma,
            blur_radius,
            padding: blur_radius.ceil(),
        }
    }

    /// `true` when neither axis blurs enough to be visible.
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.scaled_sigma.x < BLUR_EPSILON && self.scaled_sigma.y < BLUR_EPSILON
    }

    /// Uniform downsample factor shared by both axes. Never above 1.
    #[must_use]
    pub fn downsample_scale(&self) -> f32 {
        calculate_scale(self.scaled_sigma.x).min(calculate_scale(self.scaled_sigma.y))
    }
}
