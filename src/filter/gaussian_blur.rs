//! Gaussian Blur Filter
//!
//! Separable Gaussian blur rendered as up to three chained subpasses:
//!
//! ```text
//! input snapshot ─▶ Downsample ─▶ Vertical Blur ─▶ Horizontal Blur ─▶ output
//!   (w × h)         (padded · scale)   (same size)      (same size)
//! ```
//!
//! The downsample pass copies the input, plus a transparent gutter wide
//! enough for the kernel, into a target shrunk so that large sigmas stay
//! cheap. Both blur passes run at that reduced resolution with sigma and
//! radius corrected by the scale actually achieved after rounding. The
//! output transform undoes the gutter offset and the downsample so the
//! result lands on top of the source.
//!
//! A blur axis whose corrected sigma is below [`BLUR_EPSILON`] is skipped.
//! When both are, the input snapshot is returned untouched.

use std::sync::Arc;

use glam::{Mat4, UVec2, Vec2};

use crate::errors::Result;
use crate::geometry::{Rect, basis, orthographic, transform_extent};
use crate::sampler::{MinMagFilter, SamplerDescriptor, TileMode};
use crate::sigma::{BLUR_EPSILON, BlurExtent, MAX_SIGMA};
use crate::snapshot::{Entity, FilterOutput, Snapshot};
use crate::subpass::{
    BlurInfo, DeviceCapabilities, FrameInfo, GpuTexture, PipelineKind, PipelineOptions,
    PrimitiveType, Subpass, SubpassRenderer,
};

use super::planner::{
    SubpassPlan, UNIT_QUAD, calculate_uvs, expand_coverage_hint, guttered_uvs, quad_vertices,
};
use super::{FilterContents, FilterInputs};

const SNAPSHOT_LABEL: &str = "Gaussian Blur Snapshot";
const DOWNSAMPLE_LABEL: &str = "Gaussian Blur Downsample";
const VERTICAL_LABEL: &str = "Gaussian Blur Vertical";
const HORIZONTAL_LABEL: &str = "Gaussian Blur Horizontal";

const STRIP: PipelineOptions = PipelineOptions {
    primitive_type: PrimitiveType::TriangleStrip,
};

/// Two-axis Gaussian blur with a tiling policy for out-of-bounds reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBlurFilter {
    sigma_x: f32,
    sigma_y: f32,
    tile_mode: TileMode,
}

impl GaussianBlurFilter {
    /// Sigmas above 500 are accepted and clamped at render time.
    #[must_use]
    pub fn new(sigma_x: f32, sigma_y: f32, tile_mode: TileMode) -> Self {
        if sigma_x > MAX_SIGMA || sigma_y > MAX_SIGMA {
            log::warn!(
                "Blur sigma ({sigma_x}, {sigma_y}) exceeds {MAX_SIGMA} and will be clamped"
            );
        }
        Self {
            sigma_x,
            sigma_y,
            tile_mode,
        }
    }

    #[inline]
    #[must_use]
    pub fn sigma_x(&self) -> f32 {
        self.sigma_x
    }

    #[inline]
    #[must_use]
    pub fn sigma_y(&self) -> f32 {
        self.sigma_y
    }

    #[inline]
    #[must_use]
    pub fn tile_mode(&self) -> TileMode {
        self.tile_mode
    }

    /// Derived per-axis sigma, radius and padding.
    #[must_use]
    pub fn extent(&self) -> BlurExtent {
        BlurExtent::new(self.sigma_x, self.sigma_y)
    }

    /// Input region needed to produce `output_limit`.
    #[must_use]
    pub fn filter_source_coverage(
        &self,
        effect_transform: &Mat4,
        output_limit: &Rect,
    ) -> Option<Rect> {
        if output_limit.is_empty() {
            return None;
        }
        let radius = self.extent().blur_radius;
        Some(output_limit.expand(transform_extent(effect_transform, radius)))
    }

    /// Coverage of the first input grown by the blur radius.
    #[must_use]
    pub fn filter_coverage<R: SubpassRenderer>(
        &self,
        inputs: &FilterInputs<R>,
        entity: &Entity,
        effect_transform: &Mat4,
    ) -> Option<Rect> {
        let input = inputs.first()?;
        let input_coverage = input.coverage(entity)?;
        let radius = self.extent().blur_radius;
        let transform = basis(&input.transform(entity)) * basis(effect_transform);
        Some(input_coverage.expand(transform_extent(&transform, radius)))
    }

    /// Renders the blur of the first input.
    ///
    /// `coverage_hint`, when present, is the screen region the caller will
    /// actually draw. It is grown by the padding before being handed to the
    /// input so pixels within kernel reach are still produced.
    pub fn render_filter<R: SubpassRenderer>(
        &self,
        inputs: &FilterInputs<R>,
        renderer: &mut R,
        entity: &Entity,
        effect_transform: &Mat4,
        _coverage: &Rect,
        coverage_hint: Option<Rect>,
    ) -> Result<Option<FilterOutput<R::Texture>>> {
        let Some(input) = inputs.first() else {
            return Ok(None);
        };

        let extent = self.extent();
        let hint = expand_coverage_hint(
            coverage_hint,
            &(entity.transform * *effect_transform),
            extent.padding,
        );

        let Some(snapshot) = input.snapshot(SNAPSHOT_LABEL, renderer, entity, hint)? else {
            return Ok(None);
        };
        let texture_size = snapshot.texture.size();
        if texture_size.x == 0 || texture_size.y == 0 {
            log::debug!("Gaussian blur input snapshot is empty ({texture_size}), nothing to draw");
            return Ok(None);
        }

        if extent.is_noop() {
            log::debug!("Gaussian blur sigma below epsilon, passing input through");
            return Ok(Some(FilterOutput::from_snapshot(snapshot, entity)));
        }

        let capabilities = renderer.capabilities();
        let plan = SubpassPlan::new(texture_size, extent.padding, extent.downsample_scale());

        log::trace!(
            "Gaussian blur plan: source {texture_size}, padding {}, target {}, scalar {}",
            extent.padding,
            plan.size,
            plan.effective_scalar,
        );

        let uvs = calculate_uvs(input.as_ref(), entity, texture_size);
        let downsample = self.downsample_subpass(
            &snapshot,
            guttered_uvs(&uvs, texture_size, extent.padding),
            plan.size,
            capabilities,
        );
        let downsampled = renderer.run_subpass(&downsample)?;

        let pipeline = self.blur_pipeline(capabilities);
        let blur_sampler = snapshot.sampler_descriptor.with_filter(MinMagFilter::Linear);
        let texel = Vec2::ONE / plan.size.as_vec2();
        let sigma = extent.scaled_sigma * plan.effective_scalar;
        let radius = extent.blur_radius * plan.effective_scalar;

        let vertical = run_blur_pass(
            renderer,
            VERTICAL_LABEL,
            downsampled,
            plan.size,
            pipeline,
            blur_sampler,
            BlurInfo {
                blur_uv_offset: Vec2::new(0.0, texel.y),
                blur_sigma: sigma.y,
                blur_radius: radius.y,
                step_size: 1.0,
            },
        )?;

        let horizontal = run_blur_pass(
            renderer,
            HORIZONTAL_LABEL,
            vertical,
            plan.size,
            pipeline,
            blur_sampler,
            BlurInfo {
                blur_uv_offset: Vec2::new(texel.x, 0.0),
                blur_sigma: sigma.x,
                blur_radius: radius.x,
                step_size: 1.0,
            },
        )?;

        let transform = snapshot.transform
            * Mat4::from_translation((-extent.padding).extend(0.0))
            * Mat4::from_scale((Vec2::ONE / plan.effective_scalar).extend(1.0));

        let blurred = Snapshot {
            texture: horizontal,
            transform,
            sampler_descriptor: SamplerDescriptor::linear_clamp(),
            opacity: snapshot.opacity,
        };
        Ok(Some(FilterOutput::from_snapshot(blurred, entity)))
    }

    fn downsample_subpass<T>(
        &self,
        snapshot: &Snapshot<T>,
        uvs: [Vec2; 4],
        size: UVec2,
        capabilities: DeviceCapabilities,
    ) -> Subpass<T> {
        let sampler = snapshot
            .sampler_descriptor
            .with_filter(MinMagFilter::Linear)
            .with_tile_mode(self.tile_mode, capabilities);

        Subpass {
            label: DOWNSAMPLE_LABEL,
            size,
            pipeline: PipelineKind::TextureFill,
            options: STRIP,
            vertices: quad_vertices(&uvs),
            frame_info: unit_frame_info(),
            blur_info: None,
            input: Arc::clone(&snapshot.texture),
            sampler,
        }
    }

    fn blur_pipeline(&self, capabilities: DeviceCapabilities) -> PipelineKind {
        if self.tile_mode == TileMode::Decal && !capabilities.supports_decal_sampler_address_mode {
            PipelineKind::GaussianBlurDecal
        } else {
            PipelineKind::GaussianBlur
        }
    }
}

fn unit_frame_info() -> FrameInfo {
    FrameInfo {
        mvp: orthographic(Vec2::ONE),
        texture_sampler_y_coord_scale: 1.0,
        alpha: 1.0,
    }
}

/// One separable pass over `input`. Returns `input` itself when the axis
/// sigma is too small to matter.
fn run_blur_pass<R: SubpassRenderer>(
    renderer: &mut R,
    label: &'static str,
    input: Arc<R::Texture>,
    size: UVec2,
    pipeline: PipelineKind,
    sampler: SamplerDescriptor,
    blur_info: BlurInfo,
) -> Result<Arc<R::Texture>> {
    if blur_info.blur_sigma < BLUR_EPSILON {
        log::trace!("{label}: skipped");
        return Ok(input);
    }

    let subpass = Subpass {
        label,
        size,
        pipeline,
        options: STRIP,
        vertices: quad_vertices(&UNIT_QUAD),
        frame_info: unit_frame_info(),
        blur_info: Some(blur_info),
        input,
        sampler,
    };
    renderer.run_subpass(&subpass)
}

impl<R: SubpassRenderer> FilterContents<R> for GaussianBlurFilter {
    fn filter_source_coverage(
        &self,
        effect_transform: &Mat4,
        output_limit: &Rect,
    ) -> Option<Rect> {
        GaussianBlurFilter::filter_source_coverage(self, effect_transform, output_limit)
    }

    fn filter_coverage(
        &self,
        inputs: &FilterInputs<R>,
        entity: &Entity,
        effect_transform: &Mat4,
    ) -> Option<Rect> {
        GaussianBlurFilter::filter_coverage(self, inputs, entity, effect_transform)
    }

    fn render_filter(
        &self,
        inputs: &FilterInputs<R>,
        renderer: &mut R,
        entity: &Entity,
        effect_transform: &Mat4,
        coverage: &Rect,
        coverage_hint: Option<Rect>,
    ) -> Result<Option<FilterOutput<R::Texture>>> {
        GaussianBlurFilter::render_filter(
            self,
            inputs,
            renderer,
            entity,
            effect_transform,
            coverage,
            coverage_hint,
        )
    }
}
