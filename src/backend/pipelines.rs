//! Subpass Pipelines
//!
//! Bind group layouts, GPU-side uniform layouts and the render pipeline
//! cache for the two subpass shaders.
//!
//! | Group | Binding | Resource | Stages |
//! |-------|---------|----------|--------|
//! | 0 | 0 | input `texture_2d<f32>` | fragment |
//! | 0 | 1 | input sampler | fragment |
//! | 1 | 0 | `FrameInfo` uniform | vertex, fragment |
//! | 1 | 1 | `BlurInfo` uniform (blur only) | fragment |
//!
//! Group 0 depends only on the input view and sampler, so the renderer
//! caches it. Group 1 is built per subpass.

use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;

use crate::subpass::{BlurInfo, FrameInfo, PipelineKind, PipelineOptions, PrimitiveType, TextureVertex};

use super::tracked::Tracked;

/// `FrameInfo` as laid out in WGSL (80 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameInfoUniform {
    pub mvp: [[f32; 4]; 4],
    pub texture_sampler_y_coord_scale: f32,
    pub alpha: f32,
    pub _pad: [f32; 2],
}

impl From<&FrameInfo> for FrameInfoUniform {
    fn from(info: &FrameInfo) -> Self {
        Self {
            mvp: info.mvp.to_cols_array_2d(),
            texture_sampler_y_coord_scale: info.texture_sampler_y_coord_scale,
            alpha: info.alpha,
            _pad: [0.0; 2],
        }
    }
}

/// `BlurInfo` as laid out in WGSL, padded to 32 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BlurInfoUniform {
    pub uv_offset: [f32; 2],
    pub sigma: f32,
    pub radius: f32,
    pub step_size: f32,
    pub _pad: [f32; 3],
}

impl From<&BlurInfo> for BlurInfoUniform {
    fn from(info: &BlurInfo) -> Self {
        Self {
            uv_offset: info.blur_uv_offset.to_array(),
            sigma: info.blur_sigma,
            radius: info.blur_radius,
            step_size: info.step_size,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 2],
    pub texture_coords: [f32; 2],
}

impl From<&TextureVertex> for GpuVertex {
    fn from(v: &TextureVertex) -> Self {
        Self {
            position: v.position.to_array(),
            texture_coords: v.texture_coords.to_array(),
        }
    }
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

type PipelineCacheKey = (PipelineKind, PipelineOptions, wgpu::TextureFormat);

/// Layouts, shader modules and compiled pipelines for every subpass kind.
pub struct SubpassPipelines {
    /// [texture_2d, sampler]
    texture_layout: Tracked<wgpu::BindGroupLayout>,
    /// [FrameInfo]
    fill_uniform_layout: wgpu::BindGroupLayout,
    /// [FrameInfo, BlurInfo]
    blur_uniform_layout: wgpu::BindGroupLayout,

    fill_shader: wgpu::ShaderModule,
    blur_shader: wgpu::ShaderModule,

    cache: FxHashMap<PipelineCacheKey, wgpu::RenderPipeline>,
}

impl SubpassPipelines {
    /// Creates the layouts and shader modules. Pipelines are compiled on
    /// first use.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Subpass Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let frame_entry = uniform_entry(
            0,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );
        let fill_uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Fill Uniform Layout"),
            entries: &[frame_entry],
        });
        let blur_uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gaussian Blur Uniform Layout"),
            entries: &[frame_entry, uniform_entry(1, wgpu::ShaderStages::FRAGMENT)],
        });

        let fill_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Texture Fill Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/texture_fill.wgsl").into()),
        });
        let blur_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Gaussian Blur Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gaussian_blur.wgsl").into()),
        });

        Self {
            texture_layout: Tracked::new(texture_layout),
            fill_uniform_layout,
            blur_uniform_layout,
            fill_shader,
            blur_shader,
            cache: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn texture_layout(&self) -> &Tracked<wgpu::BindGroupLayout> {
        &self.texture_layout
    }

    /// Layout of group 1 for `kind`.
    #[inline]
    pub fn uniform_layout(&self, kind: PipelineKind) -> &wgpu::BindGroupLayout {
        match kind {
            PipelineKind::TextureFill => &self.fill_uniform_layout,
            PipelineKind::GaussianBlur | PipelineKind::GaussianBlurDecal => {
                &self.blur_uniform_layout
            }
        }
    }

    /// Returns the pipeline for `kind`/`options` rendering into `format`,
    /// compiling it on first request.
    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        kind: PipelineKind,
        options: PipelineOptions,
        format: wgpu::TextureFormat,
    ) -> &wgpu::RenderPipeline {
        let key = (kind, options, format);
        if !self.cache.contains_key(&key) {
            let pipeline = self.create_pipeline(device, kind, options, format);
            self.cache.insert(key, pipeline);
        }
        &self.cache[&key]
    }

    /// Number of compiled pipelines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn create_pipeline(
        &self,
        device: &wgpu::Device,
        kind: PipelineKind,
        options: PipelineOptions,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        log::debug!("Compiling {kind:?} pipeline for {options:?}, format {format:?}");

        let (module, fragment_entry) = match kind {
            PipelineKind::TextureFill => (&self.fill_shader, "fs_main"),
            PipelineKind::GaussianBlur => (&self.blur_shader, "fs_main"),
            PipelineKind::GaussianBlurDecal => (&self.blur_shader, "fs_decal"),
        };

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Subpass Pipeline Layout"),
            bind_group_layouts: &[Some(&*self.texture_layout), Some(self.uniform_layout(kind))],
            immediate_size: 0,
        });

        let topology = match options.primitive_type {
            PrimitiveType::Triangle => wgpu::PrimitiveTopology::TriangleList,
            PrimitiveType::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        };

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{kind:?} Pipeline")),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(fragment_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
