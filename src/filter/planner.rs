//! UV & Padding Planner
//!
//! Geometry shared by the blur passes: where the downsample pass samples
//! from, how big its target is, and how far a coverage hint must grow so the
//! kernel still sees every pixel it reaches.
//!
//! ```text
//!   source texture (w × h)         downsample target
//!  ┌──────────────────────┐      ┌─────────────────┐
//!  │ pad                  │      │                 │
//!  │   ┌──────────────┐   │  ──▶ │  round(padded · │
//!  │   │   texture    │   │      │        scale)   │
//!  │   └──────────────┘   │      │                 │
//!  │                  pad │      └─────────────────┘
//!  └──────────────────────┘
//!      padded = (w, h) + 2·pad
//! ```
//!
//! The gutter is synthesized by scaling the UV quad about its center, so
//! the ring outside `[0, 1]` is filled by the sampler's addressing mode.

use glam::{Mat4, UVec2, Vec2};

use crate::geometry::{Quad, Rect, anchor_scale, transform_extent, transform_quad};
use crate::input::FilterInput;
use crate::snapshot::Entity;
use crate::subpass::{SubpassRenderer, TextureVertex};

/// Unit-square positions in triangle-strip order.
pub const UNIT_QUAD: Quad = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
];

/// Grows a coverage hint by `padding` mapped through the basis of `transform`.
#[must_use]
pub fn expand_coverage_hint(hint: Option<Rect>, transform: &Mat4, padding: Vec2) -> Option<Rect> {
    hint.map(|hint| hint.expand(transform_extent(transform, padding)))
}

/// The input's local placement of a `texture_size` image, expressed in that
/// image's normalized UV space.
#[must_use]
pub fn calculate_uvs<R: SubpassRenderer>(
    input: &dyn FilterInput<R>,
    entity: &Entity,
    texture_size: UVec2,
) -> Quad {
    let local = input.local_transform(entity);
    let points = Rect::from_size(texture_size).transformed_points(&local);
    let size = texture_size.as_vec2();
    points.map(|p| p / size)
}

/// Scales `uvs` about `(0.5, 0.5)` so the quad also spans `padding` texels
/// of transparent gutter on every side.
#[must_use]
pub fn guttered_uvs(uvs: &Quad, texture_size: UVec2, padding: Vec2) -> Quad {
    let size = texture_size.as_vec2();
    let scale = (size + 2.0 * padding) / size;
    transform_quad(&anchor_scale(Vec2::splat(0.5), scale), uvs)
}

/// Pairs [`UNIT_QUAD`] positions with `uvs`.
#[must_use]
pub fn quad_vertices(uvs: &Quad) -> [TextureVertex; 4] {
    std::array::from_fn(|i| TextureVertex {
        position: UNIT_QUAD[i],
        texture_coords: uvs[i],
    })
}

/// Target size of the downsample pass and the scale it actually achieved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubpassPlan {
    /// `round(padded_size · scale)`, at least 1×1.
    pub size: UVec2,
    /// `size / padded_size` per axis. Differs from the requested scale by
    /// the rounding error, and is what the blur passes correct for.
    pub effective_scalar: Vec2,
}

impl SubpassPlan {
    #[must_use]
    pub fn new(texture_size: UVec2, padding: Vec2, downsample_scale: f32) -> Self {
        let padded_size = texture_size.as_vec2() + 2.0 * padding;
        let size = (padded_size * downsample_scale).round().max(Vec2::ONE).as_uvec2();
        Self {
            size,
            effective_scalar: size.as_vec2() / padded_size,
        }
    }
}
