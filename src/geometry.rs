//! 2D Geometry Helpers
//!
//! Axis-aligned rectangles and quads in local space, plus the handful of
//! [`Mat4`] constructors the blur passes need. Matrices follow glam's
//! column-vector convention: `a * b` applies `b` first.

use glam::{Mat4, UVec2, Vec2, Vec3};

/// Four corner points, ordered top-left, top-right, bottom-left, bottom-right.
///
/// This is also the triangle-strip order used for every blur subpass quad.
pub type Quad = [Vec2; 4];

/// Axis-aligned rectangle stored as left/top/right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    #[must_use]
    pub const fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_ltrb(x, y, x + width, y + height)
    }

    /// Rectangle at the origin with the given pixel size.
    #[must_use]
    pub fn from_size(size: UVec2) -> Self {
        Self::from_xywh(0.0, 0.0, size.x as f32, size.y as f32)
    }

    /// Smallest rectangle containing all `points`.
    #[must_use]
    pub fn bounds_of(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Some(Self::from_ltrb(min.x, min.y, max.x, max.y))
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    /// Returns `true` when the rectangle encloses no area (or is NaN).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Grows every edge outward by `amount` (per axis).
    #[must_use]
    pub fn expand(&self, amount: Vec2) -> Self {
        Self::from_ltrb(
            self.left - amount.x,
            self.top - amount.y,
            self.right + amount.x,
            self.bottom + amount.y,
        )
    }

    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// The four corners mapped through `transform` (with perspective divide).
    #[must_use]
    pub fn transformed_points(&self, transform: &Mat4) -> Quad {
        [
            Vec2::new(self.left, self.top),
            Vec2::new(self.right, self.top),
            Vec2::new(self.left, self.bottom),
            Vec2::new(self.right, self.bottom),
        ]
        .map(|p| transform_point(transform, p))
    }

    /// Axis-aligned bounds of this rectangle after `transform`.
    #[must_use]
    pub fn transform_bounds(&self, transform: &Mat4) -> Self {
        let points = self.transformed_points(transform);
        Self::bounds_of(&points).unwrap_or(*self)
    }
}

/// Maps a point through `transform`, including translation.
#[inline]
#[must_use]
pub fn transform_point(transform: &Mat4, point: Vec2) -> Vec2 {
    transform.project_point3(point.extend(0.0)).truncate()
}

/// Maps each corner of `quad` through `transform`.
#[must_use]
pub fn transform_quad(transform: &Mat4, quad: &Quad) -> Quad {
    quad.map(|p| transform_point(transform, p))
}

/// The linear part of `transform` (translation removed).
#[must_use]
pub fn basis(transform: &Mat4) -> Mat4 {
    let mut m = *transform;
    m.w_axis = glam::Vec4::W;
    m
}

/// Maps a displacement through the basis of `transform` and takes the
/// component-wise absolute value. Used for direction-agnostic expansion.
#[must_use]
pub fn transform_extent(transform: &Mat4, extent: Vec2) -> Vec2 {
    transform.transform_vector3(extent.extend(0.0)).truncate().abs()
}

/// Scale by `scale` about `anchor`.
#[must_use]
pub fn anchor_scale(anchor: Vec2, scale: Vec2) -> Mat4 {
    Mat4::from_translation(anchor.extend(0.0))
        * Mat4::from_scale(scale.extend(1.0))
        * Mat4::from_translation((-anchor).extend(0.0))
}

/// Orthographic projection mapping `(0, 0)..size` onto clip space with
/// `(0, 0)` at the top-left corner and a constant depth of 0.5.
#[must_use]
pub fn orthographic(size: Vec2) -> Mat4 {
    Mat4::from_translation(Vec3::new(-1.0, 1.0, 0.5))
        * Mat4::from_scale(Vec3::new(2.0 / size.x, -2.0 / size.y, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_grows_both_edges() {
        let r = Rect::from_xywh(10.0, 20.0, 30.0, 40.0).expand(Vec2::new(1.0, 2.0));
        assert_eq!(r, Rect::from_ltrb(9.0, 18.0, 41.0, 62.0));
    }

    #[test]
    fn empty_rects() {
        assert!(Rect::from_xywh(0.0, 0.0, 0.0, 10.0).is_empty());
        assert!(Rect::from_ltrb(5.0, 0.0, 1.0, 10.0).is_empty());
        assert!(!Rect::from_xywh(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn basis_drops_translation() {
        let m = Mat4::from_translation(Vec3::new(5.0, 6.0, 7.0)) * Mat4::from_scale(Vec3::splat(2.0));
        let b = basis(&m);
        assert_eq!(transform_point(&b, Vec2::new(1.0, 1.0)), Vec2::new(2.0, 2.0));
    }

    #[test]
    fn orthographic_maps_unit_square_to_clip_space() {
        let m = orthographic(Vec2::ONE);
        let tl = m.project_point3(Vec3::ZERO);
        let br = m.project_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((tl - Vec3::new(-1.0, 1.0, 0.5)).length() < 1e-6);
        assert!((br - Vec3::new(1.0, -1.0, 0.5)).length() < 1e-6);
    }

    #[test]
    fn anchor_scale_keeps_anchor_fixed() {
        let m = anchor_scale(Vec2::splat(0.5), Vec2::splat(2.0));
        assert_eq!(transform_point(&m, Vec2::splat(0.5)), Vec2::splat(0.5));
        assert_eq!(transform_point(&m, Vec2::ZERO), Vec2::splat(-0.5));
    }

    #[test]
    fn extent_is_direction_agnostic() {
        let flip = Mat4::from_scale(Vec3::new(-3.0, 1.0, 1.0));
        assert_eq!(transform_extent(&flip, Vec2::new(2.0, 4.0)), Vec2::new(6.0, 4.0));
    }
}
