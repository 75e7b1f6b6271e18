// src/shader.rs

//! Per-pixel shading passes over a bitmap.
//!
//! A [`Shader`] receives the pixel's current color in `[0, 1]` and its
//! fragment coordinate, may overwrite the color, and returns whether to keep
//! the result. Kept colors are clamped, scaled with `round(c * 255)` and
//! packed into the bitmap's format; discarded pixels are left untouched.
//!
//! Pixels have no data dependency on each other, so a pass can be split into
//! row stripes ([`apply_shader_parallel`]) without changing its output.

use bitflags::bitflags;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::color::{self, PixelFormat, Rgb};
use crate::types::Rect;

/// A per-pixel color function.
///
/// Any `Fn(&mut [f32; 3], [f32; 2]) -> bool` closure is a shader; state the
/// shader needs is captured by the closure.
pub trait Shader {
    /// Shade one fragment. `color` holds the existing pixel color on entry.
    /// Return `false` to discard.
    fn shade(&self, color: &mut [f32; 3], frag: [f32; 2]) -> bool;
}

impl<F> Shader for F
where
    F: Fn(&mut [f32; 3], [f32; 2]) -> bool,
{
    #[inline(always)]
    fn shade(&self, color: &mut [f32; 3], frag: [f32; 2]) -> bool {
        self(color, frag)
    }
}

bitflags! {
    /// Fragment coordinate convention.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ShaderFlags: u32 {
        /// Flip horizontally: x grows right to left.
        const INVERT_X = 0x01;
        /// Flip vertically: y grows bottom to top.
        const INVERT_Y = 0x02;
        /// Divide coordinates by the extent, giving `[0, 1]`.
        const NORMALIZE_COORDS = 0x08;
        /// Put the origin in the middle. Normalized coordinates span `[-1, 1]`.
        const CENTER_COORDS = 0x10;

        /// Normalized, origin bottom-left.
        const STANDARD = Self::INVERT_Y.bits() | Self::NORMALIZE_COORDS.bits();
    }
}

impl Default for ShaderFlags {
    fn default() -> Self {
        ShaderFlags::STANDARD
    }
}

/// Parallel shading options.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Number of threads to shade with.
    pub num_threads: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { num_threads: 1 }
    }
}

impl RenderOptions {
    /// Options for `threads` workers, where 0 means one per available core.
    pub fn with_threads(threads: usize) -> Self {
        let num_threads = match threads {
            0 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            n => n,
        };
        Self { num_threads }
    }
}

/// Maps pixel indices within an extent to fragment coordinates.
#[derive(Debug, Clone, Copy)]
struct FragmentMapper {
    width: f32,
    height: f32,
    flags: ShaderFlags,
}

impl FragmentMapper {
    fn new(width: u32, height: u32, flags: ShaderFlags) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            flags,
        }
    }

    #[inline(always)]
    fn axis(&self, index: u32, extent: f32, invert: bool) -> f32 {
        let center = index as f32 + 0.5;
        let mut v = if invert { extent - center } else { center };
        if self.flags.contains(ShaderFlags::NORMALIZE_COORDS) {
            v /= extent;
            if self.flags.contains(ShaderFlags::CENTER_COORDS) {
                v = (v - 0.5) * 2.0;
            }
        } else if self.flags.contains(ShaderFlags::CENTER_COORDS) {
            v -= extent * 0.5;
        }
        v
    }

    #[inline(always)]
    fn map(&self, x: u32, y: u32) -> [f32; 2] {
        [
            self.axis(x, self.width, self.flags.contains(ShaderFlags::INVERT_X)),
            self.axis(y, self.height, self.flags.contains(ShaderFlags::INVERT_Y)),
        ]
    }
}

/// The fragment coordinate of pixel `(x, y)` in a `width × height` area.
///
/// With [`ShaderFlags::STANDARD`] this is `((x + 0.5) / width, 1 - (y + 0.5) / height)`.
pub fn fragment_coord(x: u32, y: u32, width: u32, height: u32, flags: ShaderFlags) -> [f32; 2] {
    FragmentMapper::new(width, height, flags).map(x, y)
}

/// Shade one row of packed pixels. `y` is the row index within the shaded area.
#[inline]
fn shade_span<S: Shader + ?Sized>(
    line: &mut [u8],
    format: PixelFormat,
    y: u32,
    mapper: &FragmentMapper,
    shader: &S,
) {
    let bpp = format.bytes_per_pixel();
    for (x, px) in line.chunks_exact_mut(bpp).enumerate() {
        let (r, g, b) = color::unpack_expanded(format, color::read_packed(format, px));
        let mut rgb = Rgb::new(r, g, b).to_unit();
        if shader.shade(&mut rgb, mapper.map(x as u32, y)) {
            color::write_packed(format, px, format.pack(Rgb::from_unit(rgb)));
        }
    }
}

/// Run `shader` over every pixel of `bitmap`.
pub fn apply_shader<S: Shader + ?Sized>(bitmap: &mut Bitmap, shader: &S, flags: ShaderFlags) {
    let bounds = bitmap.bounds();
    apply_shader_region(bitmap, bounds, shader, flags);
}

/// Run `shader` over the part of `region` inside `bitmap`.
///
/// Fragment coordinates are relative to the clipped region, so a normalized
/// shader fills the region the way it would fill a whole bitmap.
pub fn apply_shader_region<S: Shader + ?Sized>(
    bitmap: &mut Bitmap,
    region: Rect,
    shader: &S,
    flags: ShaderFlags,
) {
    let Some(area) = region.intersect(&bitmap.bounds()) else {
        return;
    };
    debug!("Shading {:?} of {}x{} bitmap ({:?})", area, bitmap.width(), bitmap.height(), flags);

    let format = bitmap.format();
    let bpp = format.bytes_per_pixel();
    let mapper = FragmentMapper::new(area.w, area.h, flags);
    let x0 = area.x as usize * bpp;
    let x1 = x0 + area.w as usize * bpp;
    for row in 0..area.h {
        let line = &mut bitmap.row_mut(area.y as u32 + row)[x0..x1];
        shade_span(line, format, row, &mapper, shader);
    }
}

/// [`apply_shader`] split across row stripes on scoped threads.
///
/// Produces the same buffer as the serial pass for a deterministic shader.
pub fn apply_shader_parallel<S: Shader + Sync + ?Sized>(
    bitmap: &mut Bitmap,
    shader: &S,
    flags: ShaderFlags,
    options: RenderOptions,
) {
    let height = bitmap.height() as usize;
    let num_threads = options.num_threads.min(height);
    if num_threads <= 1 {
        apply_shader(bitmap, shader, flags);
        return;
    }
    debug!(
        "Shading {}x{} bitmap on {} threads ({:?})",
        bitmap.width(),
        bitmap.height(),
        num_threads,
        flags
    );

    let format = bitmap.format();
    let stride = bitmap.stride();
    let row_len = bitmap.width() as usize * format.bytes_per_pixel();
    let mapper = FragmentMapper::new(bitmap.width(), bitmap.height(), flags);

    let rows_per_thread = height / num_threads;
    let remainder = height % num_threads;

    // Disjoint stripes of whole rows.
    let mut stripes = Vec::with_capacity(num_threads);
    let mut remaining = bitmap.data_mut();
    let mut start_y = 0;
    for i in 0..num_threads {
        let rows = rows_per_thread + usize::from(i < remainder);
        let (chunk, rest) = remaining.split_at_mut(rows * stride);
        stripes.push((chunk, start_y));
        remaining = rest;
        start_y += rows;
    }

    std::thread::scope(|s| {
        for (chunk, start_y) in stripes {
            let mapper = &mapper;
            s.spawn(move || {
                for (i, line) in chunk.chunks_exact_mut(stride).enumerate() {
                    shade_span(&mut line[..row_len], format, (start_y + i) as u32, mapper, shader);
                }
            });
        }
    });
}

/// `x` limited to `[min, max]`.
#[inline]
pub fn clamp(x: f32, min: f32, max: f32) -> f32 {
    if x < min {
        min
    } else if x > max {
        max
    } else {
        x
    }
}

/// 0 below `edge`, 1 from `edge` on.
#[inline]
pub fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

/// Hermite interpolation between 0 and 1 as `x` moves from `edge0` to `edge1`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = clamp((x - edge0) / (edge1 - edge0), 0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Fractional part, always in `[0, 1)` for finite input.
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Floored modulo: the result has the sign of `y`.
#[inline]
pub fn modulo(x: f32, y: f32) -> f32 {
    x - y * (x / y).floor()
}

/// Linear blend from `a` (t = 0) to `b` (t = 1).
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
