// src/types.rs

//! Geometry value types shared by the rasterizer, blit engine and shader.

use serde::{Deserialize, Serialize};

/// A signed pixel coordinate. Values outside a bitmap are valid input and
/// are clipped by whichever operation consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// An axis-aligned rectangle with a signed origin and unsigned extent.
///
/// Covers columns `x..x + w` and rows `y..y + h`. Edge arithmetic is done in
/// `i64` so no origin/extent combination can overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// A rectangle anchored at the origin.
    #[inline]
    pub const fn from_size(w: u32, h: u32) -> Self {
        Self::new(0, 0, w, h)
    }

    /// A zero-sized rectangle at `(x, y)`. As a blit destination this means
    /// "same size as the source".
    #[inline]
    pub const fn at(x: i32, y: i32) -> Self {
        Self::new(x, y, 0, 0)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    #[inline]
    pub fn right(&self) -> i64 {
        self.x as i64 + self.w as i64
    }

    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.h as i64
    }

    /// Whether `(x, y)` lies inside the rectangle.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        x >= self.x as i64 && y >= self.y as i64 && x < self.right() && y < self.bottom()
    }

    /// The overlapping area of two rectangles, or `None` if they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = (self.x as i64).max(other.x as i64);
        let y0 = (self.y as i64).max(other.y as i64);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        // Both origins fit in i32 and the overlap is no larger than either extent.
        Some(Rect::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// The same rectangle moved by `(dx, dy)`, saturating at the `i32` range.
    #[inline]
    pub fn translate(&self, dx: i64, dy: i64) -> Rect {
        let clamp = |v: i64| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        Rect::new(clamp(self.x as i64 + dx), clamp(self.y as i64 + dy), self.w, self.h)
    }
}
