//! # PixelFlow Raster
//!
//! A CPU-only 2D raster core over owned pixel buffers.
//!
//! This crate provides:
//! - Packing and unpacking RGB colors in 16, 24 and 32-bit pixel formats.
//! - An owned [`Bitmap`] with clipped pixel access and a raw-byte handoff view.
//! - Lines, polylines, triangle outlines, rectangles and circles.
//! - Clipped, scaling, format-converting blits.
//! - Foreground/background painting through 8-bit coverage masks.
//! - Per-pixel shading passes, serial or split across row stripes.

/// Bitmap storage.
pub mod bitmap;
/// Rectangle copies between bitmaps.
pub mod blit;
/// Pixel formats and the RGB codec.
pub mod color;
/// Serde configuration and the global `CONFIG`.
pub mod config;
/// Error type.
pub mod error;
/// Coverage-mask blits.
pub mod mask;
/// Drawing primitives.
pub mod rasterizer;
/// Per-pixel shading.
pub mod shader;
/// Geometry value types.
pub mod types;

pub use bitmap::Bitmap;
pub use blit::{blit, blit_with_op, blit_within, BlitOp, BlitPlan};
pub use color::{pack, unpack, PixelFormat, Rgb};
pub use config::{Config, CONFIG};
pub use error::{RasterError, Result};
pub use mask::{blit_mask, blit_mask_stretched, CoverageMask, MaskMode};
pub use rasterizer::{
    draw_circle, draw_filled_circle, draw_filled_rectangle, draw_hline, draw_line, draw_polyline,
    draw_rectangle, draw_triangle,
};
pub use shader::{
    apply_shader, apply_shader_parallel, apply_shader_region, RenderOptions, Shader, ShaderFlags,
};
pub use types::{Point, Rect};
