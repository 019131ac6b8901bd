//! # Myth Blur
//!
//! A separable Gaussian blur image filter for GPU content renderers.
//!
//! The filter turns a blur strength into at most three chained subpasses
//! (downsample, vertical blur, horizontal blur) and places the result so it
//! lands exactly over its source. Large sigmas are rendered at reduced
//! resolution, so kernel cost stays bounded however strong the blur.
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`sigma`] | blur strength → scaled sigma, radius, downsample factor |
//! | [`filter`] | coverage math, pass planning, [`GaussianBlurFilter`] |
//! | [`subpass`] | the [`SubpassRenderer`] contract the filter renders through |
//! | [`backend`] | [`WgpuSubpassRenderer`], a `wgpu` implementation of that contract |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use myth_blur::{
//!     BackendSettings, Entity, FilterInput, GaussianBlurFilter, TextureFilterInput,
//!     TileMode, WgpuSubpassRenderer,
//! };
//!
//! let mut renderer = pollster::block_on(WgpuSubpassRenderer::headless(BackendSettings::default()))?;
//! let source = renderer.upload_rgba8(size, &pixels, "Source")?;
//!
//! let inputs: Vec<Arc<dyn FilterInput<WgpuSubpassRenderer>>> =
//!     vec![Arc::new(TextureFilterInput::new(source))];
//! let blur = GaussianBlurFilter::new(8.0, 8.0, TileMode::Decal);
//! let entity = Entity::new();
//!
//! let coverage = blur.filter_coverage(&inputs, &entity, &glam::Mat4::IDENTITY).unwrap_or_default();
//! if let Some(output) =
//!     blur.render_filter(&inputs, &mut renderer, &entity, &glam::Mat4::IDENTITY, &coverage, None)?
//! {
//!     // `output.texture` placed by `output.transform`
//! }
//! renderer.end_frame();
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod backend;
pub mod errors;
pub mod filter;
pub mod geometry;
pub mod input;
pub mod sampler;
pub mod settings;
pub mod sigma;
pub mod snapshot;
pub mod subpass;

pub use backend::{BackendSettings, WgpuSubpassRenderer, WgpuTexture};
pub use errors::{BlurError, Result};
pub use filter::{FilterContents, FilterInputs, GaussianBlurFilter, SubpassPlan};
pub use geometry::{Quad, Rect};
pub use input::{FilterInput, TextureFilterInput};
pub use sampler::{MinMagFilter, SamplerAddressMode, SamplerDescriptor, TileMode};
pub use settings::BlurSettings;
pub use sigma::{BlurExtent, Radius, Sigma, calculate_blur_radius, calculate_scale, scale_sigma};
pub use snapshot::{BlendMode, Entity, FilterOutput, Snapshot};
pub use subpass::{
    BlurInfo, DeviceCapabilities, FrameInfo, GpuTexture, PipelineKind, PipelineOptions,
    PrimitiveType, Subpass, SubpassRenderer, TextureVertex,
};
