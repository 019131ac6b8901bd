//! Error Types
//!
//! This module defines the error types used throughout the blur filter.
//!
//! # Overview
//!
//! Domain-level "nothing to do" outcomes (no inputs, no coverage, no snapshot)
//! are expressed as `Option::None` by the filter API and never reach this
//! module. [`BlurError`] covers the remaining failure modes:
//! - Invalid filter configuration
//! - GPU initialization failures
//! - Subpass execution failures reported by a [`SubpassRenderer`](crate::subpass::SubpassRenderer)
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, BlurError>`.
//!
//! ```rust,ignore
//! use myth_blur::errors::Result;
//!
//! fn render() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the blur filter.
#[derive(Error, Debug)]
pub enum BlurError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A blur sigma was negative, NaN or infinite.
    #[error("Invalid blur sigma: {0}")]
    InvalidSigma(f32),

    /// Settings could not be parsed.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// A subpass was asked to render into a zero-sized target.
    #[error("Subpass '{label}' has an empty target ({width}x{height})")]
    EmptySubpassTarget {
        /// Debug label of the subpass
        label: &'static str,
        /// Requested target width
        width: u32,
        /// Requested target height
        height: u32,
    },

    /// The backend failed to record or submit a subpass.
    #[error("Subpass '{label}' failed: {reason}")]
    SubpassFailed {
        /// Debug label of the subpass
        label: &'static str,
        /// Backend-specific description
        reason: String,
    },

    /// Copying a texture back to the CPU failed.
    #[error("Texture readback failed: {0}")]
    ReadbackFailed(String),
}

/// Alias for `Result<T, BlurError>`.
pub type Result<T> = std::result::Result<T, BlurError>;
