// src/blit.rs

//! Rectangular pixel copies between bitmaps.
//!
//! A blit resolves its rectangles into a [`BlitPlan`] before touching any
//! pixel, clipping against both bitmaps:
//!
//! - **Unscaled** (destination size zero, or equal to the source size): the
//!   source rect is clipped to the source bitmap, the destination is moved by
//!   the same amount, then clipped to the destination bitmap and the source
//!   trimmed to match. Pixels keep their relative positions.
//! - **Scaled** (non-matching sizes): both rects are clipped independently and
//!   every destination pixel samples its nearest source pixel.
//!
//! Scaled blits clip first and resample second, so a destination that hangs
//! off the bitmap does not keep the requested scale: the whole clipped source
//! is squeezed into the visible part. Blitting a 4x1 source into
//! `(-4, 0, 8, 1)` on a 4-pixel-wide bitmap writes the source unscaled. The
//! mask blits in [`crate::mask`] keep the scale instead.
//!
//! Pixels travel as `unpack(src.format)` → op → `pack(dst.format)`. When both
//! bitmaps share a format, bitwise ops work on packed values directly and a
//! plain copy moves whole rows.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::color::{self, PixelFormat, Rgb};
use crate::error::Result;
use crate::types::Rect;

/// How a source pixel is combined with the destination pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlitOp {
    /// Replace the destination.
    #[default]
    Copy,
    Xor,
    Or,
    And,
    /// Per-channel `min(dst + src, 255)`.
    AddSaturate,
    /// Per-channel `max(dst - src, 0)`.
    SubSaturate,
}

impl BlitOp {
    /// Ops that give the same result on packed values as on channels.
    #[inline]
    fn is_bitwise(self) -> bool {
        matches!(self, BlitOp::Copy | BlitOp::Xor | BlitOp::Or | BlitOp::And)
    }

    #[inline(always)]
    fn apply_packed(self, dst: u32, src: u32) -> u32 {
        match self {
            BlitOp::Xor => dst ^ src,
            BlitOp::Or => dst | src,
            BlitOp::And => dst & src,
            _ => src,
        }
    }

    #[inline(always)]
    fn apply_rgb(self, dst: Rgb, src: Rgb) -> Rgb {
        let each = |f: fn(u8, u8) -> u8| Rgb::new(f(dst.r, src.r), f(dst.g, src.g), f(dst.b, src.b));
        match self {
            BlitOp::Copy => src,
            BlitOp::Xor => each(|d, s| d ^ s),
            BlitOp::Or => each(|d, s| d | s),
            BlitOp::And => each(|d, s| d & s),
            BlitOp::AddSaturate => each(u8::saturating_add),
            BlitOp::SubSaturate => each(u8::saturating_sub),
        }
    }
}

/// Clipped source and destination windows of one blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitPlan {
    pub src: Rect,
    pub dst: Rect,
    /// Whether `src` and `dst` differ in size (nearest-neighbor sampling).
    pub scaled: bool,
}

impl BlitPlan {
    /// Resolve and clip the rectangles of a blit. `None` when nothing would
    /// be written.
    pub fn resolve(src_bounds: Rect, src_rect: Rect, dst_bounds: Rect, dst_rect: Rect) -> Option<Self> {
        if src_rect.is_empty() {
            return None;
        }
        let dst_w = if dst_rect.w == 0 { src_rect.w } else { dst_rect.w };
        let dst_h = if dst_rect.h == 0 { src_rect.h } else { dst_rect.h };

        if dst_w == src_rect.w && dst_h == src_rect.h {
            let src = src_rect.intersect(&src_bounds)?;
            let moved = Rect::new(dst_rect.x, dst_rect.y, src.w, src.h).translate(
                src.x as i64 - src_rect.x as i64,
                src.y as i64 - src_rect.y as i64,
            );
            let dst = moved.intersect(&dst_bounds)?;
            let src = Rect::new(src.x, src.y, dst.w, dst.h)
                .translate(dst.x as i64 - moved.x as i64, dst.y as i64 - moved.y as i64);
            Some(Self { src, dst, scaled: false })
        } else {
            let src = src_rect.intersect(&src_bounds)?;
            let dst = Rect::new(dst_rect.x, dst_rect.y, dst_w, dst_h).intersect(&dst_bounds)?;
            Some(Self {
                src,
                dst,
                scaled: src.w != dst.w || src.h != dst.h,
            })
        }
    }
}

/// Nearest source index for destination index `i`: `floor(i * src_len / dst_len)`.
#[inline(always)]
pub(crate) fn nearest(i: u32, src_len: u32, dst_len: u32) -> usize {
    (i as u64 * src_len as u64 / dst_len as u64) as usize
}

/// Copy `src_rect` of `src` into `dst_rect` of `dst`.
///
/// A zero-sized `dst_rect` takes the source size. Returns the destination
/// area written, or `None` when clipping left nothing to do.
pub fn blit(src: &Bitmap, src_rect: Rect, dst: &mut Bitmap, dst_rect: Rect) -> Option<Rect> {
    blit_with_op(src, src_rect, dst, dst_rect, BlitOp::Copy)
}

/// [`blit`] with an explicit raster op.
pub fn blit_with_op(
    src: &Bitmap,
    src_rect: Rect,
    dst: &mut Bitmap,
    dst_rect: Rect,
    op: BlitOp,
) -> Option<Rect> {
    let plan = BlitPlan::resolve(src.bounds(), src_rect, dst.bounds(), dst_rect)?;
    trace!(
        "blit {:?} {:?} -> {:?} {:?} ({:?}, scaled: {})",
        src.format(),
        plan.src,
        dst.format(),
        plan.dst,
        op,
        plan.scaled
    );
    execute(src, dst, &plan, op);
    Some(plan.dst)
}

/// Blit between two regions of the same bitmap. Overlapping regions are
/// handled by staging the source region in a temporary bitmap first.
///
/// `Ok(None)` when clipping left nothing to do; an error only when the
/// staging buffer could not be allocated.
pub fn blit_within(bitmap: &mut Bitmap, src_rect: Rect, dst_rect: Rect, op: BlitOp) -> Result<Option<Rect>> {
    let bounds = bitmap.bounds();
    let Some(plan) = BlitPlan::resolve(bounds, src_rect, bounds, dst_rect) else {
        return Ok(None);
    };

    let mut staged = Bitmap::new(plan.src.w, plan.src.h, bitmap.format())?;
    staged.set_color_key(bitmap.color_key());
    let bpp = bitmap.bytes_per_pixel();
    let x0 = plan.src.x as usize * bpp;
    let len = plan.src.w as usize * bpp;
    for row in 0..plan.src.h {
        let line = &bitmap.row(plan.src.y as u32 + row)[x0..x0 + len];
        staged.row_mut(row).copy_from_slice(line);
    }

    let staged_plan = BlitPlan {
        src: Rect::from_size(plan.src.w, plan.src.h),
        ..plan
    };
    trace!("blit within {:?} -> {:?} ({:?})", plan.src, plan.dst, op);
    execute(&staged, bitmap, &staged_plan, op);
    Ok(Some(plan.dst))
}

/// Run a resolved plan. Both windows are already inside their bitmaps.
fn execute(src: &Bitmap, dst: &mut Bitmap, plan: &BlitPlan, op: BlitOp) {
    let sf = src.format();
    let df = dst.format();
    let sbpp = sf.bytes_per_pixel();
    let dbpp = df.bytes_per_pixel();
    let key = src.color_key();
    let same_format = sf == df;

    if same_format && op == BlitOp::Copy && key.is_none() && !plan.scaled {
        let sx = plan.src.x as usize * sbpp;
        let dx = plan.dst.x as usize * dbpp;
        let len = plan.dst.w as usize * dbpp;
        for row in 0..plan.dst.h {
            let line = &src.row(plan.src.y as u32 + row)[sx..sx + len];
            dst.row_mut(plan.dst.y as u32 + row)[dx..dx + len].copy_from_slice(line);
        }
        return;
    }

    for row in 0..plan.dst.h {
        let sy = plan.src.y as usize
            + if plan.scaled {
                nearest(row, plan.src.h, plan.dst.h)
            } else {
                row as usize
            };
        let src_line = src.row(sy as u32);
        let dst_line = dst.row_mut(plan.dst.y as u32 + row);

        for col in 0..plan.dst.w {
            let sx = plan.src.x as usize
                + if plan.scaled {
                    nearest(col, plan.src.w, plan.dst.w)
                } else {
                    col as usize
                };
            let value = color::read_packed(sf, &src_line[sx * sbpp..]);
            if key == Some(value) {
                continue;
            }
            let out = &mut dst_line[(plan.dst.x as usize + col as usize) * dbpp..];
            let result = combine(sf, df, value, out, op, same_format);
            color::write_packed(df, out, result);
        }
    }
}

#[inline(always)]
fn combine(sf: PixelFormat, df: PixelFormat, value: u32, out: &[u8], op: BlitOp, same_format: bool) -> u32 {
    if op == BlitOp::Copy {
        if same_format {
            return value;
        }
        return df.pack(sf.unpack(value));
    }
    let current = color::read_packed(df, out);
    if same_format && op.is_bitwise() {
        return op.apply_packed(current, value);
    }
    df.pack(op.apply_rgb(df.unpack(current), sf.unpack(value)))
}
