// src/mask.rs

//! Coverage-mask blits.
//!
//! A [`CoverageMask`] holds one byte of coverage per pixel (0 = empty,
//! 255 = full), typically a rasterized glyph. Blitting it paints a foreground
//! and background color pair into a bitmap, blending partial coverage with
//! `(d * (255 - a) + s * a + 127) / 255` per channel.
//!
//! Clipping follows [`crate::blit`]: an unscaled mask blit moves the
//! destination along with any clipping of the mask rect. A stretched blit maps
//! the visible part of the requested destination back onto the mask, so
//! clipping the destination does not change the scale.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::blit::nearest;
use crate::color::{self, PixelFormat, Rgb};
use crate::error::{RasterError, Result};
use crate::types::{Point, Rect};

/// A borrowed 8-bit coverage buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageMask<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> CoverageMask<'a> {
    /// A tightly packed mask, one byte per pixel.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        Self::with_stride(data, width, height, width as usize)
    }

    /// A mask whose rows start `stride` bytes apart. The last row needs no
    /// padding.
    pub fn with_stride(data: &'a [u8], width: u32, height: u32, stride: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimensions { width, height });
        }
        if stride < width as usize {
            return Err(RasterError::InvalidStride {
                stride,
                min: width as usize,
            });
        }
        let expected = stride
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(width as usize))
            .unwrap_or(usize::MAX);
        if data.len() < expected {
            return Err(RasterError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Coverage at `(x, y)`.
    pub fn coverage(&self, x: i32, y: i32) -> Result<u8> {
        if !self.bounds().contains(x, y) {
            return Err(RasterError::OutOfBounds { x, y });
        }
        Ok(self.row(y as u32)[x as usize])
    }

    /// Coverage bytes of row `y`.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize]
    }
}

/// What the background color does where coverage is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MaskMode {
    /// Foreground blended over the destination; zero coverage leaves it alone.
    #[default]
    Transparent,
    /// `mix(bg, fg, a)`; the destination is overwritten everywhere.
    Opaque,
    /// Background blended over the destination with `255 - a`. Fully covered
    /// pixels are left alone, carving the mask out of a background fill.
    ReverseTransparent,
}

/// Per-pixel outcome of one coverage sample.
enum Paint {
    Keep,
    Put(u32),
    Over(Rgb, u8),
}

/// Integer src-over for one channel, rounding to nearest.
#[inline(always)]
pub(crate) fn mix_u8(a: u8, s: u8, d: u8) -> u8 {
    let a = a as u32;
    ((d as u32 * (255 - a) + s as u32 * a + 127) / 255) as u8
}

#[inline(always)]
fn mix_rgb(a: u8, s: Rgb, d: Rgb) -> Rgb {
    Rgb::new(mix_u8(a, s.r, d.r), mix_u8(a, s.g, d.g), mix_u8(a, s.b, d.b))
}

/// Packed and unpacked forms of the two colors, resolved once per blit.
struct Pens {
    format: PixelFormat,
    fg: u32,
    bg: u32,
    fg_rgb: Rgb,
    bg_rgb: Rgb,
}

impl Pens {
    fn new(format: PixelFormat, fg: u32, bg: u32) -> Self {
        Self {
            format,
            fg,
            bg,
            fg_rgb: format.unpack(fg),
            bg_rgb: format.unpack(bg),
        }
    }

    #[inline(always)]
    fn paint(&self, mode: MaskMode, a: u8) -> Paint {
        match (mode, a) {
            (MaskMode::Transparent, 0) => Paint::Keep,
            (MaskMode::Transparent, 255) => Paint::Put(self.fg),
            (MaskMode::Transparent, a) => Paint::Over(self.fg_rgb, a),
            (MaskMode::Opaque, 0) => Paint::Put(self.bg),
            (MaskMode::Opaque, 255) => Paint::Put(self.fg),
            (MaskMode::Opaque, a) => Paint::Put(self.format.pack(mix_rgb(a, self.fg_rgb, self.bg_rgb))),
            (MaskMode::ReverseTransparent, 255) => Paint::Keep,
            (MaskMode::ReverseTransparent, 0) => Paint::Put(self.bg),
            (MaskMode::ReverseTransparent, a) => Paint::Over(self.bg_rgb, 255 - a),
        }
    }
}

/// Clipped windows of a mask blit: the mask area sampled, the requested
/// destination it maps onto, and the visible part of that destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MaskPlan {
    mask: Rect,
    requested: Rect,
    visible: Rect,
}

impl MaskPlan {
    fn resolve(mask_bounds: Rect, mask_rect: Rect, dst_bounds: Rect, dst_rect: Rect) -> Option<Self> {
        if mask_rect.is_empty() {
            return None;
        }
        let req_w = if dst_rect.w == 0 { mask_rect.w } else { dst_rect.w };
        let req_h = if dst_rect.h == 0 { mask_rect.h } else { dst_rect.h };
        let mask = mask_rect.intersect(&mask_bounds)?;

        let requested = if req_w == mask_rect.w && req_h == mask_rect.h {
            Rect::new(dst_rect.x, dst_rect.y, mask.w, mask.h).translate(
                mask.x as i64 - mask_rect.x as i64,
                mask.y as i64 - mask_rect.y as i64,
            )
        } else {
            Rect::new(dst_rect.x, dst_rect.y, req_w, req_h)
        };
        let visible = requested.intersect(&dst_bounds)?;
        Some(Self {
            mask,
            requested,
            visible,
        })
    }
}

/// Paint `mask_rect` of `mask` into `dst` with its top-left corner at `at`.
///
/// `fg` and `bg` are packed in `dst`'s format. Returns the destination area
/// written, or `None` when clipping left nothing to do.
pub fn blit_mask(
    mask: &CoverageMask<'_>,
    mask_rect: Rect,
    dst: &mut Bitmap,
    at: Point,
    fg: u32,
    bg: u32,
    mode: MaskMode,
) -> Option<Rect> {
    blit_mask_stretched(mask, mask_rect, dst, Rect::at(at.x, at.y), fg, bg, mode)
}

/// Paint `mask_rect` of `mask` scaled into `dst_rect`, sampling the nearest
/// mask pixel. A zero-sized `dst_rect` takes the mask rect's size.
pub fn blit_mask_stretched(
    mask: &CoverageMask<'_>,
    mask_rect: Rect,
    dst: &mut Bitmap,
    dst_rect: Rect,
    fg: u32,
    bg: u32,
    mode: MaskMode,
) -> Option<Rect> {
    let plan = MaskPlan::resolve(mask.bounds(), mask_rect, dst.bounds(), dst_rect)?;
    trace!(
        "mask blit {:?} -> {:?} (visible {:?}, {:?})",
        plan.mask,
        plan.requested,
        plan.visible,
        mode
    );

    let format = dst.format();
    let bpp = format.bytes_per_pixel();
    let pens = Pens::new(format, fg, bg);
    let skip_x = (plan.visible.x as i64 - plan.requested.x as i64) as u32;
    let skip_y = (plan.visible.y as i64 - plan.requested.y as i64) as u32;

    for row in 0..plan.visible.h {
        let my = plan.mask.y as usize + nearest(skip_y + row, plan.mask.h, plan.requested.h);
        let coverage = mask.row(my as u32);
        let line = dst.row_mut(plan.visible.y as u32 + row);

        for col in 0..plan.visible.w {
            let mx = plan.mask.x as usize + nearest(skip_x + col, plan.mask.w, plan.requested.w);
            let out = &mut line[(plan.visible.x as usize + col as usize) * bpp..];
            match pens.paint(mode, coverage[mx]) {
                Paint::Keep => {}
                Paint::Put(value) => color::write_packed(format, out, value),
                Paint::Over(src, a) => {
                    let current = format.unpack(color::read_packed(format, out));
                    color::write_packed(format, out, format.pack(mix_rgb(a, src, current)));
                }
            }
        }
    }
    Some(plan.visible)
}
