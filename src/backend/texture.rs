use glam::UVec2;

use crate::subpass::GpuTexture;

use super::tracked::Tracked;

/// A 2D texture with its default view.
#[derive(Debug)]
pub struct WgpuTexture {
    texture: wgpu::Texture,
    view: Tracked<wgpu::TextureView>,
}

impl WgpuTexture {
    /// Render-target-and-sampleable 2D texture.
    pub(crate) fn new_render_target(
        device: &wgpu::Device,
        size: UVec2,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        Self::from_texture(texture)
    }

    /// Wraps a texture created elsewhere. It must allow `TEXTURE_BINDING`
    /// to be used as a subpass input.
    #[must_use]
    pub fn from_texture(texture: wgpu::Texture) -> Self {
        let view = Tracked::new(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        Self { texture, view }
    }

    #[inline]
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    #[must_use]
    pub fn view(&self) -> &Tracked<wgpu::TextureView> {
        &self.view
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }
}

impl GpuTexture for WgpuTexture {
    fn size(&self) -> UVec2 {
        UVec2::new(self.texture.width(), self.texture.height())
    }
}
