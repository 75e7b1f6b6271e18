// src/error.rs

//! Error type shared by every raster operation that can fail.
//!
//! Only construction and read accessors report errors. Drawing and blitting
//! clip silently, so coordinates outside a bitmap never surface here.

use thiserror::Error;

/// Errors reported by the raster core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// A pixel format identifier (or mask combination) that is not in the format table.
    #[error("unrecognized pixel format: {0:#010x}")]
    InvalidFormat(u32),
    /// Bitmaps must have a non-zero width and height.
    #[error("invalid bitmap dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// Explicit row pitch smaller than one packed row.
    #[error("row stride {stride} is smaller than the minimum of {min} bytes")]
    InvalidStride { stride: usize, min: usize },
    /// An adopted buffer does not match the declared dimensions and format.
    #[error("buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    /// The pixel buffer could not be allocated.
    #[error("failed to allocate {bytes} bytes for pixel buffer")]
    OutOfMemory { bytes: usize },
    /// A read accessor was given a coordinate outside the bitmap.
    #[error("pixel ({x}, {y}) is outside the bitmap")]
    OutOfBounds { x: i32, y: i32 },
}

/// Result alias for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
