// src/bitmap.rs

//! Owned pixel buffers.
//!
//! A [`Bitmap`] exclusively owns a row-major byte buffer holding packed
//! pixels in one fixed [`PixelFormat`]. Rows are `stride` bytes apart; with
//! the default constructor the stride is exactly `width * bytes_per_pixel`, so
//! the buffer is `width * height * bytes_per_pixel` bytes with no padding.
//!
//! Releasing the buffer is `Drop`: ownership guarantees it happens exactly
//! once. `Clone` performs a deep copy.

use log::debug;

use crate::color::{self, PixelFormat, Rgb};
use crate::error::{RasterError, Result};
use crate::types::Rect;

/// A rectangular pixel buffer with a fixed pixel format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    clear_color: u32,
    color_key: Option<u32>,
}

/// Allocate a zeroed buffer, reporting failure instead of aborting.
fn alloc_zeroed(len: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| RasterError::OutOfMemory { bytes: len })?;
    data.resize(len, 0);
    Ok(data)
}

/// Validate dimensions and compute `(stride, buffer_len)`.
fn layout(
    width: u32,
    height: u32,
    format: PixelFormat,
    stride: Option<usize>,
) -> Result<(usize, usize)> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    let overflow = RasterError::OutOfMemory { bytes: usize::MAX };
    let min = (width as usize)
        .checked_mul(format.bytes_per_pixel())
        .ok_or_else(|| overflow.clone())?;
    let stride = match stride {
        Some(stride) if stride < min => return Err(RasterError::InvalidStride { stride, min }),
        Some(stride) => stride,
        None => min,
    };
    let len = stride.checked_mul(height as usize).ok_or(overflow)?;
    Ok((stride, len))
}

impl Bitmap {
    /// Create a zero-filled bitmap with tightly packed rows.
    ///
    /// # Errors
    /// `InvalidDimensions` if either side is zero, `OutOfMemory` if the
    /// buffer cannot be allocated.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        Self::build(width, height, format, None)
    }

    /// Create a zero-filled bitmap whose rows are `stride` bytes apart.
    ///
    /// # Errors
    /// As [`Bitmap::new`], plus `InvalidStride` if `stride` cannot hold a row.
    pub fn with_stride(width: u32, height: u32, format: PixelFormat, stride: usize) -> Result<Self> {
        Self::build(width, height, format, Some(stride))
    }

    fn build(width: u32, height: u32, format: PixelFormat, stride: Option<usize>) -> Result<Self> {
        let (stride, len) = layout(width, height, format, stride)?;
        let data = alloc_zeroed(len)?;
        debug!(
            "Created {}x{} {:?} bitmap (stride {}, {} bytes)",
            width, height, format, stride, len
        );
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
            clear_color: 0,
            color_key: None,
        })
    }

    /// Adopt a buffer already filled with packed pixels, e.g. by an image
    /// decoder. The buffer must be exactly `width * height * bytes_per_pixel`.
    pub fn from_data(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let (stride, len) = layout(width, height, format, None)?;
        if data.len() != len {
            return Err(RasterError::BufferSize {
                expected: len,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
            clear_color: 0,
            color_key: None,
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
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes between the starts of consecutive rows.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// The full bitmap as a rectangle at the origin.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Byte offset of pixel `(x, y)`, or `None` outside the bitmap.
    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(y as usize * self.stride + x as usize * self.bytes_per_pixel())
    }

    /// Read the packed value at `(x, y)`.
    ///
    /// # Errors
    /// `OutOfBounds` if the coordinate lies outside the bitmap.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<u32> {
        let off = self.offset(x, y).ok_or(RasterError::OutOfBounds { x, y })?;
        Ok(color::read_packed(self.format, &self.data[off..]))
    }

    /// Write a packed value at `(x, y)`. Coordinates outside the bitmap are
    /// ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, value: u32) {
        if let Some(off) = self.offset(x, y) {
            color::write_packed(self.format, &mut self.data[off..], value);
        }
    }

    /// Read the pixel at `(x, y)` as an RGB triple.
    pub fn get_rgb(&self, x: i32, y: i32) -> Result<Rgb> {
        self.get_pixel(x, y).map(|v| self.format.unpack(v))
    }

    /// Write an RGB triple at `(x, y)`, packed into this bitmap's format.
    pub fn put_rgb(&mut self, x: i32, y: i32, color: Rgb) {
        let value = self.format.pack(color);
        self.put_pixel(x, y, value);
    }

    /// Pack a color into this bitmap's format.
    #[inline]
    pub fn pack(&self, color: Rgb) -> u32 {
        self.format.pack(color)
    }

    /// Unpack a value of this bitmap's format.
    #[inline]
    pub fn unpack(&self, value: u32) -> Rgb {
        self.format.unpack(value)
    }

    /// The packed value [`Bitmap::clear`] writes.
    #[inline]
    pub fn clear_color(&self) -> u32 {
        self.clear_color
    }

    /// Set the packed clear value (in this bitmap's format).
    pub fn set_clear_color(&mut self, value: u32) {
        self.clear_color = value;
    }

    /// Fill every pixel with the clear color.
    pub fn clear(&mut self) {
        self.fill(self.clear_color);
    }

    /// Fill every pixel with `value`.
    pub fn fill(&mut self, value: u32) {
        let bpp = self.bytes_per_pixel();
        let row_bytes = self.width as usize * bpp;
        let stride = self.stride;

        // Pack the first row, then replicate it.
        let (first, rest) = self.data.split_at_mut(stride);
        for px in first[..row_bytes].chunks_exact_mut(bpp) {
            color::write_packed(self.format, px, value);
        }
        for row in rest.chunks_exact_mut(stride) {
            row[..row_bytes].copy_from_slice(&first[..row_bytes]);
        }
    }

    /// The packed value treated as transparent when this bitmap is a blit source.
    #[inline]
    pub fn color_key(&self) -> Option<u32> {
        self.color_key
    }

    pub fn set_color_key(&mut self, key: Option<u32>) {
        self.color_key = key;
    }

    /// The whole buffer, row-major, `stride` bytes per row.
    ///
    /// This is the zero-copy handoff to a presentation layer; the borrow ends
    /// before the bitmap can be resized or dropped.
    #[inline]
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable view of the whole buffer, for decoders filling a fresh bitmap.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The packed pixels of row `y`, without trailing pitch padding.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * self.bytes_per_pixel()]
    }

    /// Mutable packed pixels of row `y`.
    ///
    /// # Panics
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let len = self.width as usize * self.bytes_per_pixel();
        &mut self.data[start..start + len]
    }

    /// Reallocate to new dimensions. The contents are zeroed; format, clear
    /// color and color key are kept. Rows become tightly packed.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let (stride, len) = layout(width, height, self.format, None)?;
        self.data = alloc_zeroed(len)?;
        self.width = width;
        self.height = height;
        self.stride = stride;
        debug!("Resized bitmap to {}x{} ({} bytes)", width, height, len);
        Ok(())
    }

    /// Give up ownership of the buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_new_zeroed_and_sized() {
        for format in PixelFormat::ALL {
            let bmp = Bitmap::new(7, 3, format).unwrap();
            assert_eq!(bmp.raw_data().len(), 7 * 3 * format.bytes_per_pixel());
            assert!(bmp.raw_data().iter().all(|&b| b == 0));
            assert_eq!(bmp.stride(), 7 * format.bytes_per_pixel());
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            Bitmap::new(0, 5, PixelFormat::Xrgb8888),
            Err(RasterError::InvalidDimensions { width: 0, height: 5 })
        );
        assert!(matches!(
            Bitmap::new(5, 0, PixelFormat::Rgb565),
            Err(RasterError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_huge_allocation_reports_out_of_memory() {
        let result = Bitmap::new(u32::MAX, u32::MAX, PixelFormat::Xrgb8888);
        assert!(matches!(result, Err(RasterError::OutOfMemory { .. })));
    }

    #[test]
    fn test_stride_validation() {
        assert_eq!(
            Bitmap::with_stride(10, 2, PixelFormat::Bgr24, 29),
            Err(RasterError::InvalidStride { stride: 29, min: 30 })
        );
        let bmp = Bitmap::with_stride(10, 2, PixelFormat::Bgr24, 32).unwrap();
        assert_eq!(bmp.raw_data().len(), 64);
        assert_eq!(bmp.row(1).len(), 30);
    }

    #[test]
    fn test_put_get_roundtrip() {
        let mut bmp = Bitmap::new(4, 4, PixelFormat::Rgb565).unwrap();
        bmp.put_pixel(2, 3, 0xF800);
        assert_eq!(bmp.get_pixel(2, 3), Ok(0xF800));
        assert_eq!(bmp.get_rgb(2, 3), Ok(Rgb::new(248, 0, 0)));
        assert_eq!(bmp.get_pixel(0, 0), Ok(0));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut bmp = Bitmap::new(4, 4, PixelFormat::Xrgb8888).unwrap();
        let before = bmp.raw_data().to_vec();
        for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 4), (i32::MIN, i32::MAX)] {
            bmp.put_pixel(x, y, 0x00FF_FFFF);
            assert_eq!(bmp.get_pixel(x, y), Err(RasterError::OutOfBounds { x, y }));
        }
        assert_eq!(bmp.raw_data(), &before[..]);
    }

    #[test]
    fn test_clear_uses_clear_color() {
        let mut bmp = Bitmap::with_stride(3, 3, PixelFormat::Bgr24, 12).unwrap();
        bmp.set_clear_color(bmp.pack(Rgb::new(1, 2, 3)));
        bmp.clear();
        for y in 0..3 {
            assert_eq!(bmp.row(y), &[3, 2, 1, 3, 2, 1, 3, 2, 1]);
            // Padding bytes are left untouched.
            let start = y as usize * 12;
            assert_eq!(&bmp.raw_data()[start + 9..start + 12], &[0, 0, 0]);
        }
    }

    #[test]
    fn test_from_data_checks_length() {
        let bmp = Bitmap::from_data(2, 2, PixelFormat::Rgb565, vec![0xAB; 8]).unwrap();
        assert_eq!(bmp.get_pixel(1, 1), Ok(0xABAB));
        assert_eq!(
            Bitmap::from_data(2, 2, PixelFormat::Rgb565, vec![0; 7]),
            Err(RasterError::BufferSize { expected: 8, actual: 7 })
        );
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = Bitmap::new(2, 2, PixelFormat::Xrgb8888).unwrap();
        let b = a.clone();
        a.put_pixel(0, 0, 0x123456);
        assert_eq!(b.get_pixel(0, 0), Ok(0));
    }

    #[test]
    fn test_resize_keeps_format_and_clear_color() {
        let mut bmp = Bitmap::new(2, 2, PixelFormat::Rgb565).unwrap();
        bmp.set_clear_color(0x07E0);
        bmp.put_pixel(1, 1, 0xFFFF);
        bmp.resize(5, 1).unwrap();
        assert_eq!((bmp.width(), bmp.height()), (5, 1));
        assert_eq!(bmp.format(), PixelFormat::Rgb565);
        assert_eq!(bmp.clear_color(), 0x07E0);
        assert_eq!(bmp.raw_data(), &[0u8; 10][..]);
        assert!(bmp.resize(0, 1).is_err());
    }
}
