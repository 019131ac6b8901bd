//! Transient Texture Pool
//!
//! Recycles subpass render targets between frames. Every subpass asks for a
//! fresh target; the pool hands out a free texture of the same key when it
//! has one and creates a new one otherwise.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │              TransientTexturePool                │
//! │                                                  │
//! │  active: [Arc<WgpuTexture>]                      │
//! │  free:   FxHashMap<Key, Vec<PooledTexture>>      │
//! │                                                  │
//! │  allocate() → Arc<WgpuTexture>                   │
//! │  reset()    (frame end: release unshared)        │
//! │  trim(n)    (drop textures idle > n frames)      │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Handles are shared with callers. A texture only moves back to the free
//! list once the pool holds the last handle to it, so a blur result kept
//! across frames is never overwritten.

use std::sync::Arc;

use glam::UVec2;
use rustc_hash::FxHashMap;

use super::texture::WgpuTexture;

/// Descriptor for requesting a transient texture.
#[derive(Clone, Debug)]
pub struct TransientTextureDesc<'a> {
    pub size: UVec2,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    pub label: &'a str,
}

/// Textures are only recycled for identical size, format and usage.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct PoolKey {
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
}

impl PoolKey {
    fn from_desc(desc: &TransientTextureDesc<'_>) -> Self {
        Self {
            width: desc.size.x,
            height: desc.size.y,
            format: desc.format,
            usage: desc.usage,
        }
    }

    fn from_texture(texture: &wgpu::Texture) -> Self {
        Self {
            width: texture.width(),
            height: texture.height(),
            format: texture.format(),
            usage: texture.usage(),
        }
    }
}

struct PooledTexture {
    texture: Arc<WgpuTexture>,
    /// Frames spent in the free list without being reused.
    idle_frames: u32,
}

/// Pool of render targets for subpass outputs.
#[derive(Default)]
pub struct TransientTexturePool {
    /// Handed out and not yet released.
    active: Vec<Arc<WgpuTexture>>,
    free: FxHashMap<PoolKey, Vec<PooledTexture>>,
}

impl TransientTexturePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a texture matching `desc`, reusing a free one if possible.
    pub fn allocate(
        &mut self,
        device: &wgpu::Device,
        desc: &TransientTextureDesc<'_>,
    ) -> Arc<WgpuTexture> {
        let key = PoolKey::from_desc(desc);

        let texture = match self.free.get_mut(&key).and_then(Vec::pop) {
            Some(pooled) => pooled.texture,
            None => {
                log::trace!("Creating transient texture '{}' ({})", desc.label, desc.size);
                Arc::new(WgpuTexture::new_render_target(
                    device,
                    desc.size,
                    desc.format,
                    desc.usage,
                    desc.label,
                ))
            }
        };

        self.active.push(Arc::clone(&texture));
        texture
    }

    /// Moves every active texture nobody else holds back to the free list.
    pub fn reset(&mut self) {
        let (released, held): (Vec<_>, Vec<_>) = self
            .active
            .drain(..)
            .partition(|texture| Arc::strong_count(texture) == 1);
        self.active = held;

        for texture in released {
            let key = PoolKey::from_texture(texture.texture());
            self.free.entry(key).or_default().push(PooledTexture {
                texture,
                idle_frames: 0,
            });
        }
    }

    /// Releases free textures that have been idle for more than
    /// `max_idle_frames` calls.
    pub fn trim(&mut self, max_idle_frames: u32) {
        for bucket in self.free.values_mut() {
            for t in bucket.iter_mut() {
                t.idle_frames += 1;
            }
            bucket.retain(|t| t.idle_frames <= max_idle_frames);
        }
        self.free.retain(|_, bucket| !bucket.is_empty());
    }

    /// Textures still handed out (including ones callers are holding).
    #[must_use]
    pub fn active_texture_count(&self) -> usize {
        self.active.len()
    }

    /// Total textures managed by the pool, active and free.
    #[must_use]
    pub fn total_texture_count(&self) -> usize {
        self.active.len() + self.free.values().map(Vec::len).sum::<usize>()
    }
}
