//! Snapshots, Entities & Filter Output
//!
//! A [`Snapshot`] is a rendered image plus everything needed to composite
//! it: placement transform, sampler state and opacity. Filters never mutate
//! a snapshot's texture; they render new textures and wrap them in new
//! snapshots.

use std::ops::Deref;
use std::sync::Arc;

use glam::Mat4;

use crate::sampler::SamplerDescriptor;

/// Compositing operator for placing a result into its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    // Porter-Duff
    Clear,
    Source,
    Destination,
    #[default]
    SourceOver,
    DestinationOver,
    SourceIn,
    DestinationIn,
    SourceOut,
    DestinationOut,
    SourceATop,
    DestinationATop,
    Xor,
    Plus,
    Modulate,
    // Separable
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Multiply,
}

/// The scene object a filter is applied to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    /// Local-to-screen transform.
    pub transform: Mat4,
    pub blend_mode: BlendMode,
    pub clip_depth: u32,
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            blend_mode: BlendMode::default(),
            clip_depth: 0,
        }
    }
}

impl Entity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    #[must_use]
    pub fn with_clip_depth(mut self, clip_depth: u32) -> Self {
        self.clip_depth = clip_depth;
        self
    }
}

/// A texture with its placement.
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Shared with whoever produced it.
    pub texture: Arc<T>,
    /// Maps texture pixel space into local space.
    pub transform: Mat4,
    pub sampler_descriptor: SamplerDescriptor,
    pub opacity: f32,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            texture: Arc::clone(&self.texture),
            transform: self.transform,
            sampler_descriptor: self.sampler_descriptor,
            opacity: self.opacity,
        }
    }
}

/// A filter's placed result: a snapshot plus how to composite it.
#[derive(Debug)]
pub struct FilterOutput<T> {
    pub snapshot: Snapshot<T>,
    pub blend_mode: BlendMode,
    pub clip_depth: u32,
}

impl<T> FilterOutput<T> {
    /// Wraps `snapshot` with the compositing state of `entity`.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot<T>, entity: &Entity) -> Self {
        Self {
            snapshot,
            blend_mode: entity.blend_mode,
            clip_depth: entity.clip_depth,
        }
    }
}

impl<T> Deref for FilterOutput<T> {
    type Target = Snapshot<T>;
    fn deref(&self) -> &Self::Target {
        &self.snapshot
    }
}
