//! Shared test doubles for the filter tests.
//!
//! - [`RecordingRenderer`]: a `SubpassRenderer` that keeps every subpass
//!   record and returns fake textures of the requested size.
//! - [`RecordingInput`]: a texture input that remembers the coverage limits
//!   it was asked for.
//! - [`MissingSnapshotInput`] / [`NoCoverageInput`]: inputs that have
//!   nothing to offer.

#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::Arc;

use glam::{Mat4, UVec2, Vec2};
use myth_blur::errors::Result;
use myth_blur::{
    BlurInfo, DeviceCapabilities, Entity, FilterInput, FrameInfo, GpuTexture, PipelineKind,
    PipelineOptions, Rect, SamplerDescriptor, Snapshot, Subpass, SubpassRenderer, TextureVertex,
};

// ============================================================================
// Approximate comparison
// ============================================================================

pub const EPSILON: f32 = 1e-4;

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec2_approx(a: Vec2, b: Vec2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

pub fn rect_approx(a: &Rect, b: &Rect) -> bool {
    approx_eq(a.left, b.left)
        && approx_eq(a.top, b.top)
        && approx_eq(a.right, b.right)
        && approx_eq(a.bottom, b.bottom)
}

pub fn map_point(m: &Mat4, p: Vec2) -> Vec2 {
    m.project_point3(p.extend(0.0)).truncate()
}

// ============================================================================
// Fake textures & renderer
// ============================================================================

#[derive(Debug)]
pub struct FakeTexture {
    pub id: usize,
    pub size: UVec2,
}

impl GpuTexture for FakeTexture {
    fn size(&self) -> UVec2 {
        self.size
    }
}

/// A subpass as seen by the renderer, with the input reduced to its ID.
#[derive(Debug, Clone)]
pub struct RecordedSubpass {
    pub label: &'static str,
    pub size: UVec2,
    pub pipeline: PipelineKind,
    pub options: PipelineOptions,
    pub vertices: [TextureVertex; 4],
    pub frame_info: FrameInfo,
    pub blur_info: Option<BlurInfo>,
    pub input_id: usize,
    pub input_size: UVec2,
    pub sampler: SamplerDescriptor,
    pub output_id: usize,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub capabilities: DeviceCapabilities,
    pub subpasses: Vec<RecordedSubpass>,
    next_id: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decal_support() -> Self {
        Self {
            capabilities: DeviceCapabilities::default().with_decal_sampler_address_mode(true),
            ..Self::default()
        }
    }

    pub fn texture(&mut self, width: u32, height: u32) -> Arc<FakeTexture> {
        self.next_id += 1;
        Arc::new(FakeTexture {
            id: self.next_id,
            size: UVec2::new(width, height),
        })
    }
}

impl SubpassRenderer for RecordingRenderer {
    type Texture = FakeTexture;

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn run_subpass(&mut self, subpass: &Subpass<FakeTexture>) -> Result<Arc<FakeTexture>> {
        let output = self.texture(subpass.size.x, subpass.size.y);
        self.subpasses.push(RecordedSubpass {
            label: subpass.label,
            size: subpass.size,
            pipeline: subpass.pipeline,
            options: subpass.options,
            vertices: subpass.vertices,
            frame_info: subpass.frame_info,
            blur_info: subpass.blur_info,
            input_id: subpass.input.id,
            input_size: subpass.input.size,
            sampler: subpass.sampler,
            output_id: output.id,
        });
        Ok(output)
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Texture input placed by `entity.transform * local_transform`.
pub struct RecordingInput {
    pub texture: Arc<FakeTexture>,
    pub local_transform: Mat4,
    pub opacity: f32,
    pub sampler: SamplerDescriptor,
    pub requested_limits: RefCell<Vec<Option<Rect>>>,
}

impl RecordingInput {
    pub fn new(texture: Arc<FakeTexture>) -> Self {
        Self {
            texture,
            local_transform: Mat4::IDENTITY,
            opacity: 1.0,
            sampler: SamplerDescriptor::linear_clamp(),
            requested_limits: RefCell::new(Vec::new()),
        }
    }

    pub fn with_local_transform(mut self, local_transform: Mat4) -> Self {
        self.local_transform = local_transform;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerDescriptor) -> Self {
        self.sampler = sampler;
        self
    }
}

impl FilterInput<RecordingRenderer> for RecordingInput {
    fn snapshot(
        &self,
        _label: &str,
        _renderer: &mut RecordingRenderer,
        entity: &Entity,
        coverage_limit: Option<Rect>,
    ) -> Result<Option<Snapshot<FakeTexture>>> {
        self.requested_limits.borrow_mut().push(coverage_limit);
        Ok(Some(Snapshot {
            texture: Arc::clone(&self.texture),
            transform: self.transform(entity),
            sampler_descriptor: self.sampler,
            opacity: self.opacity,
        }))
    }

    fn coverage(&self, entity: &Entity) -> Option<Rect> {
        Some(Rect::from_size(self.texture.size).transform_bounds(&self.transform(entity)))
    }

    fn local_transform(&self, _entity: &Entity) -> Mat4 {
        self.local_transform
    }
}

/// Has coverage but never produces a snapshot.
pub struct MissingSnapshotInput;

impl FilterInput<RecordingRenderer> for MissingSnapshotInput {
    fn snapshot(
        &self,
        _label: &str,
        _renderer: &mut RecordingRenderer,
        _entity: &Entity,
        _coverage_limit: Option<Rect>,
    ) -> Result<Option<Snapshot<FakeTexture>>> {
        Ok(None)
    }

    fn coverage(&self, _entity: &Entity) -> Option<Rect> {
        Some(Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
    }
}

/// Has no coverage at all.
pub struct NoCoverageInput;

impl FilterInput<RecordingRenderer> for NoCoverageInput {
    fn snapshot(
        &self,
        _label: &str,
        _renderer: &mut RecordingRenderer,
        _entity: &Entity,
        _coverage_limit: Option<Rect>,
    ) -> Result<Option<Snapshot<FakeTexture>>> {
        Ok(None)
    }

    fn coverage(&self, _entity: &Entity) -> Option<Rect> {
        None
    }
}

pub fn inputs_of<I>(input: I) -> Vec<Arc<dyn FilterInput<RecordingRenderer>>>
where
    I: FilterInput<RecordingRenderer> + 'static,
{
    vec![Arc::new(input)]
}
