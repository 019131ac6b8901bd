//! Filter Inputs
//!
//! A [`FilterInput`] is anything a filter can read pixels from: an already
//! rendered texture, another filter's output, or scene contents rendered on
//! demand. Filters only see it through this trait.

use std::sync::Arc;

use glam::Mat4;

use crate::errors::Result;
use crate::geometry::Rect;
use crate::sampler::SamplerDescriptor;
use crate::snapshot::{Entity, Snapshot};
use crate::subpass::{GpuTexture, SubpassRenderer};

/// Source of pixels for a filter.
pub trait FilterInput<R: SubpassRenderer> {
    /// Renders (or fetches) the input as a placed texture.
    ///
    /// `coverage_limit` is the region the caller actually needs; an input may
    /// use it to avoid producing pixels outside it. `Ok(None)` means the
    /// input has nothing to draw.
    fn snapshot(
        &self,
        label: &str,
        renderer: &mut R,
        entity: &Entity,
        coverage_limit: Option<Rect>,
    ) -> Result<Option<Snapshot<R::Texture>>>;

    /// Screen-space bounds of the input, if it has any.
    fn coverage(&self, entity: &Entity) -> Option<Rect>;

    /// Input-to-screen transform.
    fn transform(&self, entity: &Entity) -> Mat4 {
        entity.transform * self.local_transform(entity)
    }

    /// Input-local transform applied before the entity transform.
    fn local_transform(&self, _entity: &Entity) -> Mat4 {
        Mat4::IDENTITY
    }
}

/// An existing texture used as a filter input.
#[derive(Debug)]
pub struct TextureFilterInput<T> {
    texture: Arc<T>,
    local_transform: Mat4,
}

impl<T> TextureFilterInput<T> {
    #[must_use]
    pub fn new(texture: Arc<T>) -> Self {
        Self {
            texture,
            local_transform: Mat4::IDENTITY,
        }
    }

    #[must_use]
    pub fn with_local_transform(mut self, local_transform: Mat4) -> Self {
        self.local_transform = local_transform;
        self
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> &Arc<T> {
        &self.texture
    }
}

impl<R> FilterInput<R> for TextureFilterInput<R::Texture>
where
    R: SubpassRenderer,
{
    fn snapshot(
        &self,
        _label: &str,
        _renderer: &mut R,
        entity: &Entity,
        _coverage_limit: Option<Rect>,
    ) -> Result<Option<Snapshot<R::Texture>>> {
        Ok(Some(Snapshot {
            texture: Arc::clone(&self.texture),
            transform: FilterInput::<R>::transform(self, entity),
            sampler_descriptor: SamplerDescriptor::linear_clamp(),
            opacity: 1.0,
        }))
    }

    fn coverage(&self, entity: &Entity) -> Option<Rect> {
        let bounds = Rect::from_size(self.texture.size());
        Some(bounds.transform_bounds(&FilterInput::<R>::transform(self, entity)))
    }

    fn local_transform(&self, _entity: &Entity) -> Mat4 {
        self.local_transform
    }
}
