//! Coverage-mask blits through the public API.

use pixelflow_raster::rasterizer::draw_filled_rectangle;
use pixelflow_raster::{
    blit_mask, blit_mask_stretched, Bitmap, CoverageMask, MaskMode, PixelFormat, Point, Rect, Rgb,
};
use test_log::test;

/// A 3x3 plus sign with soft edges.
const PLUS: [u8; 9] = [0, 128, 0, 128, 255, 128, 0, 128, 0];

fn backdrop(format: PixelFormat) -> Bitmap {
    let mut bmp = Bitmap::new(9, 7, format).unwrap();
    for y in 0..7 {
        for x in 0..9 {
            bmp.put_rgb(x, y, Rgb::new((x * 25) as u8, (y * 35) as u8, 0x40));
        }
    }
    bmp
}

#[test]
fn test_full_coverage_matches_filled_rectangle() {
    let full = [255u8; 12];
    let mask = CoverageMask::new(&full, 4, 3).unwrap();
    for format in PixelFormat::ALL {
        let mut painted = backdrop(format);
        let mut filled = painted.clone();
        let ink = painted.pack(Rgb::YELLOW);
        blit_mask(&mask, mask.bounds(), &mut painted, Point::new(6, 5), ink, 0, MaskMode::Transparent);
        draw_filled_rectangle(&mut filled, Rect::new(6, 5, 4, 3), ink);
        assert_eq!(painted, filled, "{:?}", format);
    }
}

#[test]
fn test_same_size_stretch_matches_unscaled() {
    let mask = CoverageMask::new(&PLUS, 3, 3).unwrap();
    for format in PixelFormat::ALL {
        for mode in [MaskMode::Transparent, MaskMode::Opaque, MaskMode::ReverseTransparent] {
            let mut a = backdrop(format);
            let mut b = a.clone();
            let (fg, bg) = (a.pack(Rgb::CYAN), a.pack(Rgb::MAGENTA));
            blit_mask(&mask, mask.bounds(), &mut a, Point::new(-1, 5), fg, bg, mode);
            blit_mask_stretched(&mask, mask.bounds(), &mut b, Rect::new(-1, 5, 3, 3), fg, bg, mode);
            assert_eq!(a, b, "{:?} {:?}", format, mode);
        }
    }
}

#[test]
fn test_integer_stretch_replicates_blocks() {
    let mask = CoverageMask::new(&PLUS, 3, 3).unwrap();
    let mut dst = Bitmap::new(9, 9, PixelFormat::Xrgb8888).unwrap();
    let (fg, bg) = (dst.pack(Rgb::WHITE), dst.pack(Rgb::BLACK));
    let written = blit_mask_stretched(&mask, mask.bounds(), &mut dst, Rect::new(0, 0, 9, 9), fg, bg, MaskMode::Opaque);
    assert_eq!(written, Some(Rect::new(0, 0, 9, 9)));
    for y in 0..9 {
        for x in 0..9 {
            let gray = PLUS[(y / 3 * 3 + x / 3) as usize];
            assert_eq!(dst.get_rgb(x, y), Ok(Rgb::new(gray, gray, gray)), "({}, {})", x, y);
        }
    }
}

#[test]
fn test_glyph_from_strided_atlas() {
    // Two 3x3 glyphs side by side in a 7-byte-pitch atlas; pick the second.
    let mut atlas = vec![0u8; 7 * 2 + 6];
    for row in 0..3 {
        atlas[row * 7 + 3..row * 7 + 6].copy_from_slice(&PLUS[row * 3..row * 3 + 3]);
    }
    let mask = CoverageMask::with_stride(&atlas, 6, 3, 7).unwrap();
    let mut dst = Bitmap::new(3, 3, PixelFormat::Rgb565).unwrap();
    let (fg, bg) = (dst.pack(Rgb::WHITE), dst.pack(Rgb::BLACK));
    blit_mask(&mask, Rect::new(3, 0, 3, 3), &mut dst, Point::new(0, 0), fg, bg, MaskMode::Opaque);
    assert_eq!(dst.get_pixel(1, 1), Ok(fg));
    assert_eq!(dst.get_pixel(0, 0), Ok(bg));
    assert_eq!(dst.get_pixel(1, 0), Ok(dst.pack(Rgb::new(128, 128, 128))));
}

#[test]
fn test_transparent_zero_coverage_preserves_destination() {
    let mask = CoverageMask::new(&PLUS, 3, 3).unwrap();
    let before = backdrop(PixelFormat::Bgr24);
    let mut dst = before.clone();
    let fg = dst.pack(Rgb::RED);
    blit_mask(&mask, mask.bounds(), &mut dst, Point::new(2, 2), fg, 0, MaskMode::Transparent);
    for (x, y) in [(2, 2), (4, 2), (2, 4), (4, 4)] {
        assert_eq!(dst.get_pixel(x, y), before.get_pixel(x, y));
    }
    assert_eq!(dst.get_pixel(3, 3), Ok(fg));
    assert_ne!(dst.get_pixel(3, 2), before.get_pixel(3, 2));
}
