//! Image Filters
//!
//! A filter turns one or more [`FilterInput`]s into a new placed texture.
//! Besides rendering, every filter answers two geometric questions without
//! touching the GPU:
//!
//! - **source coverage**: which input region is needed to produce a given
//!   output region;
//! - **coverage**: which region the output will touch.
//!
//! The renderer drives filters through [`FilterContents`], so different
//! filter types can sit behind one trait object.

pub mod gaussian_blur;
pub mod planner;

use std::sync::Arc;

use glam::Mat4;

use crate::errors::Result;
use crate::geometry::Rect;
use crate::input::FilterInput;
use crate::snapshot::{Entity, FilterOutput};
use crate::subpass::SubpassRenderer;

pub use gaussian_blur::GaussianBlurFilter;
pub use planner::SubpassPlan;

/// Shared handles to the inputs of one filter invocation.
pub type FilterInputs<R> = [Arc<dyn FilterInput<R>>];

/// A filter the renderer can query and render.
pub trait FilterContents<R: SubpassRenderer> {
    /// Input region needed to produce `output_limit`, or `None` when the
    /// limit is empty.
    fn filter_source_coverage(
        &self,
        effect_transform: &Mat4,
        output_limit: &Rect,
    ) -> Option<Rect>;

    /// Region the filter output covers.
    fn filter_coverage(
        &self,
        inputs: &FilterInputs<R>,
        entity: &Entity,
        effect_transform: &Mat4,
    ) -> Option<Rect>;

    /// Renders the filter. `Ok(None)` means there was nothing to draw.
    fn render_filter(
        &self,
        inputs: &FilterInputs<R>,
        renderer: &mut R,
        entity: &Entity,
        effect_transform: &Mat4,
        coverage: &Rect,
        coverage_hint: Option<Rect>,
    ) -> Result<Option<FilterOutput<R::Texture>>>;
}
