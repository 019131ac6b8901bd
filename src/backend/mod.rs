//! wgpu Subpass Backend
//!
//! [`WgpuSubpassRenderer`] executes [`Subpass`] records on a `wgpu` device.
//! Each call renders exactly one quad into a fresh pooled target:
//!
//! ```text
//! Subpass ─▶ pool.allocate(size) ─▶ pipeline (cached by kind/options/format)
//!         ─▶ group 0: input view + sampler (cached)
//!         ─▶ group 1: FrameInfo [+ BlurInfo] uniforms
//!         ─▶ vertex buffer (4 vertices) ─▶ draw(0..4) ─▶ submit
//! ```
//!
//! Call [`WgpuSubpassRenderer::end_frame`] once per frame so unused targets
//! return to the pool.

mod pipelines;
mod texture;
mod tracked;
pub mod transient_pool;

use std::sync::Arc;
use std::sync::mpsc;

use glam::UVec2;
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::errors::{BlurError, Result};
use crate::sampler::{MinMagFilter, SamplerAddressMode, SamplerDescriptor};
use crate::subpass::{DeviceCapabilities, GpuTexture, PipelineKind, Subpass, SubpassRenderer};

pub use pipelines::{BlurInfoUniform, FrameInfoUniform, GpuVertex};
pub use texture::WgpuTexture;
pub use tracked::Tracked;

use pipelines::SubpassPipelines;
use transient_pool::{TransientTextureDesc, TransientTexturePool};

/// Configuration for [`WgpuSubpassRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Format of every subpass target.
    ///
    /// Must be renderable and filterable. Default: `Rgba8Unorm`.
    pub color_format: wgpu::TextureFormat,
    /// Prepended to GPU object labels, for telling several renderers apart
    /// in captures.
    pub label_prefix: Option<String>,
    /// Frames a free pooled target survives before it is destroyed.
    /// Default: 3.
    pub max_idle_frames: u32,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            color_format: wgpu::TextureFormat::Rgba8Unorm,
            label_prefix: None,
            max_idle_frames: 3,
        }
    }
}

const TARGET_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
    .union(wgpu::TextureUsages::TEXTURE_BINDING)
    .union(wgpu::TextureUsages::COPY_SRC);

const UPLOAD_USAGE: wgpu::TextureUsages = TARGET_USAGE.union(wgpu::TextureUsages::COPY_DST);

/// Runs blur subpasses on a `wgpu` device.
pub struct WgpuSubpassRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    settings: BackendSettings,
    capabilities: DeviceCapabilities,

    pool: TransientTexturePool,
    pipelines: SubpassPipelines,
    samplers: FxHashMap<SamplerDescriptor, Tracked<wgpu::Sampler>>,
    /// Group 0 keyed by (view id, sampler id). Cleared every frame.
    texture_bind_groups: FxHashMap<(u64, u64), wgpu::BindGroup>,
}

impl WgpuSubpassRenderer {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, settings: BackendSettings) -> Self {
        let capabilities = DeviceCapabilities::default().with_decal_sampler_address_mode(
            device
                .features()
                .contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER),
        );
        log::debug!("Subpass renderer capabilities: {capabilities:?}");

        let pipelines = SubpassPipelines::new(&device);

        Self {
            device,
            queue,
            settings,
            capabilities,
            pool: TransientTexturePool::new(),
            pipelines,
            samplers: FxHashMap::default(),
            texture_bind_groups: FxHashMap::default(),
        }
    }

    /// Creates a renderer on the default adapter without a surface.
    ///
    /// Border addressing is requested when the adapter offers it.
    pub async fn headless(settings: BackendSettings) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| BlurError::AdapterRequestFailed(e.to_string()))?;

        let required_features = adapter.features() & wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Blur Device"),
                required_features,
                required_limits: adapter.limits(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        Ok(Self::new(device, queue, settings))
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn pool(&self) -> &TransientTexturePool {
        &self.pool
    }

    /// Number of pipelines compiled so far.
    #[must_use]
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Wraps a texture created outside this renderer so it can be used as
    /// filter input. It needs `TEXTURE_BINDING` usage and a filterable format.
    #[must_use]
    pub fn import_texture(&self, texture: wgpu::Texture) -> Arc<WgpuTexture> {
        Arc::new(WgpuTexture::from_texture(texture))
    }

    /// Creates an `Rgba8Unorm` texture filled with tightly packed RGBA8
    /// `pixels`, usable as filter input whatever the target format is.
    pub fn upload_rgba8(
        &self,
        size: UVec2,
        pixels: &[u8],
        label: &str,
    ) -> Result<Arc<WgpuTexture>> {
        if size.x == 0 || size.y == 0 {
            return Err(BlurError::EmptySubpassTarget {
                label: "Upload",
                width: size.x,
                height: size.y,
            });
        }
        let expected = size.x as usize * size.y as usize * 4;
        if pixels.len() != expected {
            return Err(BlurError::SubpassFailed {
                label: "Upload",
                reason: format!("expected {expected} bytes for {size}, got {}", pixels.len()),
            });
        }

        let texture = WgpuTexture::new_render_target(
            &self.device,
            size,
            wgpu::TextureFormat::Rgba8Unorm,
            UPLOAD_USAGE,
            &self.label(label),
        );
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: texture.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.x * 4),
                rows_per_image: Some(size.y),
            },
            extent(size),
        );
        Ok(Arc::new(texture))
    }

    /// Copies an RGBA8 texture back to the CPU, rows tightly packed.
    ///
    /// Blocks until the GPU has finished every submitted subpass. Textures in
    /// any other format are rejected with [`BlurError::ReadbackFailed`].
    pub fn read_rgba8(&self, texture: &WgpuTexture) -> Result<Vec<u8>> {
        let format = texture.format();
        if !matches!(
            format,
            wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb
        ) {
            return Err(BlurError::ReadbackFailed(format!("cannot read {format:?} as RGBA8")));
        }

        let size = texture.size();
        let row_bytes = size.x * 4;
        let padded_row_bytes = row_bytes.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&self.label("Readback Buffer")),
            size: u64::from(padded_row_bytes) * u64::from(size.y),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: texture.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: None,
                },
            },
            extent(size),
        );
        self.queue.submit([encoder.finish()]);

        let (sender, receiver) = mpsc::channel();
        buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = sender.send(result);
            });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| BlurError::ReadbackFailed(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| BlurError::ReadbackFailed(e.to_string()))?
            .map_err(|e| BlurError::ReadbackFailed(e.to_string()))?;

        let mapped = buffer.slice(..).get_mapped_range();
        let mut pixels = Vec::with_capacity(row_bytes as usize * size.y as usize);
        for row in mapped.chunks_exact(padded_row_bytes as usize) {
            pixels.extend_from_slice(&row[..row_bytes as usize]);
        }
        drop(mapped);
        buffer.unmap();

        Ok(pixels)
    }

    /// Returns unshared targets to the pool, drops long-idle ones and clears
    /// per-frame bind groups.
    pub fn end_frame(&mut self) {
        self.texture_bind_groups.clear();
        self.pool.reset();
        self.pool.trim(self.settings.max_idle_frames);
    }

    fn label(&self, label: &str) -> String {
        match &self.settings.label_prefix {
            Some(prefix) => format!("{prefix} {label}"),
            None => label.to_string(),
        }
    }

    fn validate(&self, subpass: &Subpass<WgpuTexture>) -> Result<()> {
        let size = subpass.size;
        if size.x == 0 || size.y == 0 {
            return Err(BlurError::EmptySubpassTarget {
                label: subpass.label,
                width: size.x,
                height: size.y,
            });
        }

        let max = self.device.limits().max_texture_dimension_2d;
        if size.x > max || size.y > max {
            return Err(BlurError::SubpassFailed {
                label: subpass.label,
                reason: format!("target {size} exceeds the device limit of {max}"),
            });
        }

        if subpass.pipeline != PipelineKind::TextureFill && subpass.blur_info.is_none() {
            return Err(BlurError::SubpassFailed {
                label: subpass.label,
                reason: "blur pipeline without blur parameters".to_string(),
            });
        }
        Ok(())
    }

    fn sampler_id(&mut self, descriptor: SamplerDescriptor) -> u64 {
        if let Some(sampler) = self.samplers.get(&descriptor) {
            return sampler.id();
        }

        let supports_decal = self.capabilities.supports_decal_sampler_address_mode;
        let address_mode = |mode| to_wgpu_address_mode(mode, supports_decal);
        let uses_border = [
            address_mode(descriptor.width_address_mode),
            address_mode(descriptor.height_address_mode),
        ]
        .contains(&wgpu::AddressMode::ClampToBorder);

        let sampler = Tracked::new(self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Subpass Sampler"),
            address_mode_u: address_mode(descriptor.width_address_mode),
            address_mode_v: address_mode(descriptor.height_address_mode),
            mag_filter: to_wgpu_filter(descriptor.mag_filter),
            min_filter: to_wgpu_filter(descriptor.min_filter),
            border_color: uses_border.then_some(wgpu::SamplerBorderColor::TransparentBlack),
            ..Default::default()
        }));
        let id = sampler.id();
        self.samplers.insert(descriptor, sampler);
        id
    }

    fn texture_bind_group(
        &mut self,
        input: &WgpuTexture,
        descriptor: SamplerDescriptor,
    ) -> wgpu::BindGroup {
        let sampler_id = self.sampler_id(descriptor);
        let key = (input.view().id(), sampler_id);

        if let Some(cached) = self.texture_bind_groups.get(&key) {
            return cached.clone();
        }

        let sampler = &self.samplers[&descriptor];
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Subpass Texture BindGroup"),
            layout: self.pipelines.texture_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        self.texture_bind_groups.insert(key, bind_group.clone());
        bind_group
    }

    fn uniform_bind_group(&self, subpass: &Subpass<WgpuTexture>) -> wgpu::BindGroup {
        let frame_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Subpass FrameInfo"),
            contents: bytemuck::bytes_of(&FrameInfoUniform::from(&subpass.frame_info)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let blur_buffer = subpass.blur_info.as_ref().map(|info| {
            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Subpass BlurInfo"),
                contents: bytemuck::bytes_of(&BlurInfoUniform::from(info)),
                usage: wgpu::BufferUsages::UNIFORM,
            })
        });

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: frame_buffer.as_entire_binding(),
        }];
        if let (PipelineKind::GaussianBlur | PipelineKind::GaussianBlurDecal, Some(buffer)) =
            (subpass.pipeline, &blur_buffer)
        {
            entries.push(wgpu::BindGroupEntry {
                binding: 1,
                resource: buffer.as_entire_binding(),
            });
        }

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Subpass Uniform BindGroup"),
            layout: self.pipelines.uniform_layout(subpass.pipeline),
            entries: &entries,
        })
    }
}

impl SubpassRenderer for WgpuSubpassRenderer {
    type Texture = WgpuTexture;

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn run_subpass(&mut self, subpass: &Subpass<WgpuTexture>) -> Result<Arc<WgpuTexture>> {
        self.validate(subpass)?;

        log::trace!(
            "Subpass '{}': {:?} into {}",
            subpass.label,
            subpass.pipeline,
            subpass.size
        );

        let label = self.label(subpass.label);
        let format = self.settings.color_format;
        let target = self.pool.allocate(
            &self.device,
            &TransientTextureDesc {
                size: subpass.size,
                format,
                usage: TARGET_USAGE,
                label: &label,
            },
        );

        let texture_bind_group = self.texture_bind_group(&subpass.input, subpass.sampler);
        let uniform_bind_group = self.uniform_bind_group(subpass);

        let vertices = subpass.vertices.map(|v| GpuVertex::from(&v));
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Subpass Vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&label),
            });

        {
            let pipeline =
                self.pipelines
                    .get_or_create(&self.device, subpass.pipeline, subpass.options, format);

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                ..Default::default()
            });

            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &texture_bind_group, &[]);
            pass.set_bind_group(1, &uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.draw(0..4, 0..1);
        }

        self.queue.submit([encoder.finish()]);
        Ok(target)
    }
}

fn extent(size: UVec2) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.x,
        height: size.y,
        depth_or_array_layers: 1,
    }
}

fn to_wgpu_filter(filter: MinMagFilter) -> wgpu::FilterMode {
    match filter {
        MinMagFilter::Nearest => wgpu::FilterMode::Nearest,
        MinMagFilter::Linear => wgpu::FilterMode::Linear,
    }
}

/// `Decal` becomes a transparent border when the device has one, and
/// clamp-to-edge otherwise.
fn to_wgpu_address_mode(mode: SamplerAddressMode, supports_decal: bool) -> wgpu::AddressMode {
    match mode {
        SamplerAddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        SamplerAddressMode::Repeat => wgpu::AddressMode::Repeat,
        SamplerAddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
        SamplerAddressMode::Decal if supports_decal => wgpu::AddressMode::ClampToBorder,
        SamplerAddressMode::Decal => wgpu::AddressMode::ClampToEdge,
    }
}
