//! Subpass Contract
//!
//! The blur never talks to a GPU API directly. Each stage is described by an
//! immutable [`Subpass`] record and handed to a [`SubpassRenderer`], which
//! records and submits it and returns the rendered texture.
//!
//! ```text
//! GaussianBlurFilter ── Subpass ──▶ SubpassRenderer::run_subpass ──▶ Arc<Texture>
//!                                   (pipeline lookup, sampler, vertex +
//!                                    uniform upload, one draw call)
//! ```
//!
//! The record carries everything the backend needs, so nothing from the
//! caller's stack frame is captured across the call.

use std::sync::Arc;

use glam::{Mat4, UVec2, Vec2};

use crate::errors::Result;
use crate::sampler::SamplerDescriptor;

/// A GPU image the blur can read from and size its passes by.
pub trait GpuTexture {
    /// Pixel dimensions.
    fn size(&self) -> UVec2;
}

/// Device features that change how the passes are planned.
///
/// Injected into planning as plain data rather than queried through a
/// device type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCapabilities {
    /// Samplers can address outside `[0, 1]` as transparent black.
    pub supports_decal_sampler_address_mode: bool,
}

impl DeviceCapabilities {
    #[must_use]
    pub const fn with_decal_sampler_address_mode(mut self, supported: bool) -> Self {
        self.supports_decal_sampler_address_mode = supported;
        self
    }
}

/// Which shader program a subpass draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Textured quad: samples the input through the quad's UVs.
    TextureFill,
    /// Separable 1-D Gaussian along `BlurInfo::blur_uv_offset`.
    GaussianBlur,
    /// Same as `GaussianBlur`, but samples outside `[0, 1]` read as
    /// transparent. Used when the sampler cannot do decal addressing.
    GaussianBlurDecal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    #[default]
    Triangle,
    TriangleStrip,
}

/// Fixed-function state the pipeline is looked up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PipelineOptions {
    pub primitive_type: PrimitiveType,
}

/// One vertex of a subpass quad.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureVertex {
    /// Position in the unit square (projected by `FrameInfo::mvp`).
    pub position: Vec2,
    /// Texture coordinate into the subpass input.
    pub texture_coords: Vec2,
}

/// Vertex-stage uniforms shared by every subpass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub mvp: Mat4,
    /// `-1` flips the V coordinate, `1` leaves it.
    pub texture_sampler_y_coord_scale: f32,
    pub alpha: f32,
}

/// Fragment uniforms for the separable blur kernel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlurInfo {
    /// One texel step along the blur axis, in UV units.
    pub blur_uv_offset: Vec2,
    pub blur_sigma: f32,
    /// Kernel half-width in texels; bounds the shader's sample count.
    pub blur_radius: f32,
    pub step_size: f32,
}

/// Everything needed to render one stage.
#[derive(Debug)]
pub struct Subpass<T> {
    pub label: &'static str,
    /// Target size in pixels.
    pub size: UVec2,
    pub pipeline: PipelineKind,
    pub options: PipelineOptions,
    /// Triangle-strip quad.
    pub vertices: [TextureVertex; 4],
    pub frame_info: FrameInfo,
    /// Present only for the blur pipelines.
    pub blur_info: Option<BlurInfo>,
    /// Texture bound for sampling.
    pub input: Arc<T>,
    pub sampler: SamplerDescriptor,
}

/// The GPU abstraction the blur renders through.
pub trait SubpassRenderer {
    type Texture: GpuTexture;

    /// Features of the device this renderer records for.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Renders `subpass` into a fresh target and returns it.
    ///
    /// Returns once the commands are recorded and the output handle exists;
    /// GPU execution may still be in flight.
    fn run_subpass(&mut self, subpass: &Subpass<Self::Texture>) -> Result<Arc<Self::Texture>>;
}
