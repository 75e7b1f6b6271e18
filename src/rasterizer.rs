// src/rasterizer.rs

//! Vector primitives drawn into a [`Bitmap`].
//!
//! Every primitive writes packed values in the target bitmap's format and
//! clips pixel-by-pixel (or span-by-span), so geometry partially or entirely
//! outside the bitmap is normal input:
//!
//! ```text
//! draw_line / draw_polyline / draw_triangle / draw_rectangle / draw_circle
//!     └── put_pixel (per-pixel clip)
//! draw_filled_circle / draw_filled_rectangle
//!     └── draw_hline (per-span clip)
//! ```
//!
//! Triangles are outlines only; there is no polygon fill.

use crate::bitmap::Bitmap;
use crate::color;
use crate::types::{Point, Rect};

/// Put a pixel given wide coordinates, ignoring anything beyond `i32`.
#[inline(always)]
fn plot(bitmap: &mut Bitmap, x: i64, y: i64, color: u32) {
    if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
        bitmap.put_pixel(x, y, color);
    }
}

/// Draw a line from `p0` to `p1` with Bresenham's algorithm.
///
/// Both endpoints are included and every pixel on the path is written once.
/// Endpoints are put in a canonical order first, so swapping them produces
/// the same pixel set. `p0 == p1` draws a single pixel.
///
/// Only the part of the major axis inside the bitmap is walked: the
/// minor-axis offset at step `t` of a Bresenham walk over `major` steps is
/// `floor((2 * t * minor + major) / (2 * major))`, so far off-bitmap
/// endpoints cost nothing.
pub fn draw_line(bitmap: &mut Bitmap, p0: Point, p1: Point, color: u32) {
    let (a, b) = if (p1.x, p1.y) < (p0.x, p0.y) {
        (p1, p0)
    } else {
        (p0, p1)
    };

    let (x0, y0) = (a.x as i64, a.y as i64);
    let (x1, y1) = (b.x as i64, b.y as i64);

    // Segments whose bounding box misses the bitmap cannot touch it.
    let (w, h) = (bitmap.width() as i64, bitmap.height() as i64);
    if x1 < 0 || x0 >= w || y0.max(y1) < 0 || y0.min(y1) >= h {
        return;
    }

    // Canonical order makes x non-decreasing; y may run either way.
    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let sy = if y1 < y0 { -1 } else { 1 };

    if dx >= dy {
        if dx == 0 {
            plot(bitmap, x0, y0, color);
            return;
        }
        let t_lo = (-x0).max(0);
        let t_hi = (w - 1 - x0).min(dx);
        for t in t_lo..=t_hi {
            plot(bitmap, x0 + t, y0 + sy * minor_offset(t, dy, dx), color);
        }
    } else {
        let (t_lo, t_hi) = if sy > 0 {
            ((-y0).max(0), (h - 1 - y0).min(dy))
        } else {
            ((y0 - (h - 1)).max(0), y0.min(dy))
        };
        for t in t_lo..=t_hi {
            plot(bitmap, x0 + minor_offset(t, dx, dy), y0 + sy * t, color);
        }
    }
}

/// Minor-axis distance from the start after `t` major steps.
#[inline(always)]
fn minor_offset(t: i64, minor: i64, major: i64) -> i64 {
    ((2 * t as i128 * minor as i128 + major as i128) / (2 * major as i128)) as i64
}

/// Draw connected segments through `points`, closing the loop back to the
/// first point when `closed` is set.
///
/// No points draws nothing; a single point draws one pixel.
pub fn draw_polyline(bitmap: &mut Bitmap, points: &[Point], closed: bool, color: u32) {
    match points {
        [] => {}
        [p] => draw_line(bitmap, *p, *p, color),
        _ => {
            for pair in points.windows(2) {
                draw_line(bitmap, pair[0], pair[1], color);
            }
            if closed {
                draw_line(bitmap, points[points.len() - 1], points[0], color);
            }
        }
    }
}

/// Draw the three edges of a triangle.
pub fn draw_triangle(bitmap: &mut Bitmap, p0: Point, p1: Point, p2: Point, color: u32) {
    draw_line(bitmap, p0, p1, color);
    draw_line(bitmap, p1, p2, color);
    draw_line(bitmap, p2, p0, color);
}

/// Fill columns `x0..=x1` (either order) of row `y`, clipped to the bitmap.
pub fn draw_hline(bitmap: &mut Bitmap, x0: i32, x1: i32, y: i32, color: u32) {
    if y < 0 || y as u32 >= bitmap.height() {
        return;
    }
    let (lo, hi) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
    let lo = lo.max(0) as i64;
    let hi = (hi as i64).min(bitmap.width() as i64 - 1);
    if lo > hi {
        return;
    }

    let format = bitmap.format();
    let bpp = format.bytes_per_pixel();
    let row = bitmap.row_mut(y as u32);
    for px in row[lo as usize * bpp..(hi as usize + 1) * bpp].chunks_exact_mut(bpp) {
        color::write_packed(format, px, color);
    }
}

/// Draw the one-pixel outline of `rect`. Empty rectangles draw nothing.
pub fn draw_rectangle(bitmap: &mut Bitmap, rect: Rect, color: u32) {
    if rect.is_empty() {
        return;
    }
    let x0 = rect.x as i64;
    let y0 = rect.y as i64;
    let x1 = rect.right() - 1;
    let y1 = rect.bottom() - 1;

    let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    let edge = |bitmap: &mut Bitmap, ax: i64, ay: i64, bx: i64, by: i64| {
        draw_line(bitmap, Point::new(clamp(ax), clamp(ay)), Point::new(clamp(bx), clamp(by)), color);
    };

    edge(bitmap, x0, y0, x1, y0);
    if y1 > y0 {
        edge(bitmap, x0, y1, x1, y1);
    }
    if y1 - y0 > 1 {
        edge(bitmap, x0, y0 + 1, x0, y1 - 1);
        if x1 > x0 {
            edge(bitmap, x1, y0 + 1, x1, y1 - 1);
        }
    }
}

/// Fill every pixel of `rect` that lies inside the bitmap.
pub fn draw_filled_rectangle(bitmap: &mut Bitmap, rect: Rect, color: u32) {
    let Some(area) = rect.intersect(&bitmap.bounds()) else {
        return;
    };
    let x1 = area.x + area.w as i32 - 1;
    for y in area.y..area.y + area.h as i32 {
        draw_hline(bitmap, area.x, x1, y, color);
    }
}

/// Largest `s` with `s * s <= v`.
fn isqrt(v: u128) -> u128 {
    let mut s = (v as f64).sqrt() as u128;
    while s * s > v {
        s -= 1;
    }
    while (s + 1) * (s + 1) <= v {
        s += 1;
    }
    s
}

/// Fill every pixel whose squared distance from `(cx, cy)` is at most `r²`.
///
/// Only rows inside both the circle's bounding box and the bitmap are
/// visited; each row is written as one clipped span. A radius of zero sets
/// the center pixel, a negative radius draws nothing.
pub fn draw_filled_circle(bitmap: &mut Bitmap, cx: i32, cy: i32, r: i32, color: u32) {
    if r < 0 {
        return;
    }
    let (cx, cy, r) = (cx as i64, cy as i64, r as i64);
    let r2 = r * r;
    let top = (cy - r).max(0);
    let bottom = (cy + r).min(bitmap.height() as i64 - 1);

    for y in top..=bottom {
        let dy = y - cy;
        let half = isqrt((r2 - dy * dy) as u128) as i64;
        let x0 = (cx - half).max(i32::MIN as i64) as i32;
        let x1 = (cx + half).min(i32::MAX as i64) as i32;
        draw_hline(bitmap, x0, x1, y as i32, color);
    }
}

/// Draw a circle outline with the integer midpoint criterion.
///
/// In the first octant the column for row offset `y` is the largest `x`
/// with `(x - 1/2)² + y² < r²`; the other seven octants mirror it. Only
/// offsets whose mirrored rows or columns cross the bitmap are visited, so
/// huge radii cost no more than the bitmap's perimeter.
pub fn draw_circle(bitmap: &mut Bitmap, cx: i32, cy: i32, r: i32, color: u32) {
    if r < 0 {
        return;
    }
    let (cx, cy, r) = (cx as i64, cy as i64, r as i64);
    let (w, h) = (bitmap.width() as i64, bitmap.height() as i64);
    if cx + r < 0 || cx - r >= w || cy + r < 0 || cy - r >= h {
        return;
    }
    if r == 0 {
        plot(bitmap, cx, cy, color);
        return;
    }

    // Offsets landing on a visible row (cy ± y) or column (cx ± y).
    let mut offsets = Vec::new();
    for (c, extent) in [(cy, h), (cx, w)] {
        for (lo, hi) in [(-c, extent - 1 - c), (c - (extent - 1), c)] {
            offsets.extend(lo.max(0)..=hi.min(r));
        }
    }
    offsets.sort_unstable();
    offsets.dedup();

    let r2 = (r * r) as u128;
    for y in offsets {
        // (2x - 1)² < 4(r² - y²), solved for the largest x.
        let q = 4 * (r2 - (y * y) as u128);
        let x = ((isqrt(q.saturating_sub(1)) + 1) / 2) as i64;
        if x < y {
            break;
        }
        for (px, py) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            plot(bitmap, cx + px, cy + py, color);
        }
    }
}
