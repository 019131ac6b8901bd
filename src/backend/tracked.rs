//! Resource Identity
//!
//! Texture bind groups are cached per frame under `(view ID, sampler ID)`.
//! Both halves come from [`Tracked`]: every [`super::WgpuTexture`] view and
//! every cached sampler is wrapped in one.
//!
//! IDs are drawn from one process-wide counter, so two renderers never hand
//! out the same ID for different views.

use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A GPU object tagged with a process-unique ID.
///
/// wgpu handles are not hashable by identity, so the ID stands in for the
/// object in bind group cache keys.
#[derive(Debug)]
pub struct Tracked<T> {
    inner: T,
    id: u64,
}

impl<T> Tracked<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            id: next_id(),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
