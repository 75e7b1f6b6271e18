//! Blits between bitmaps: clipping, format conversion, scaling, ops.

use pixelflow_raster::{blit, blit_with_op, blit_within, pack, Bitmap, BlitOp, PixelFormat, Rect, Rgb};
use test_log::test;

fn gradient(w: u32, h: u32, format: PixelFormat) -> Bitmap {
    let mut bmp = Bitmap::new(w, h, format).unwrap();
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            bmp.put_rgb(x, y, Rgb::new((x * 30) as u8, (y * 30) as u8, 0xC0));
        }
    }
    bmp
}

#[test]
fn test_identity_copy_matches_source() {
    let src = gradient(6, 4, PixelFormat::Xrgb8888);
    let mut dst = Bitmap::new(6, 4, PixelFormat::Xrgb8888).unwrap();
    blit(&src, src.bounds(), &mut dst, Rect::at(0, 0));
    assert_eq!(dst.raw_data(), src.raw_data());
}

#[test]
fn test_offset_copy_clips_to_single_pixel() {
    let mut src = Bitmap::new(4, 4, PixelFormat::Xrgb8888).unwrap();
    src.fill(0x00AB_CDEF);
    let mut dst = Bitmap::new(4, 4, PixelFormat::Xrgb8888).unwrap();
    let written = blit(&src, src.bounds(), &mut dst, Rect::at(3, 3));
    assert_eq!(written, Some(Rect::new(3, 3, 1, 1)));
    for y in 0..4 {
        for x in 0..4 {
            let expected = if (x, y) == (3, 3) { 0x00AB_CDEF } else { 0 };
            assert_eq!(dst.get_pixel(x, y), Ok(expected), "({}, {})", x, y);
        }
    }
}

#[test]
fn test_negative_destination_takes_lower_right_of_source() {
    let src = gradient(4, 4, PixelFormat::Xrgb8888);
    let mut dst = Bitmap::new(4, 4, PixelFormat::Xrgb8888).unwrap();
    assert_eq!(
        blit(&src, src.bounds(), &mut dst, Rect::at(-2, -1)),
        Some(Rect::new(0, 0, 2, 3))
    );
    assert_eq!(dst.get_pixel(0, 0), src.get_pixel(2, 1));
    assert_eq!(dst.get_pixel(1, 2), src.get_pixel(3, 3));
    assert_eq!(dst.get_pixel(2, 0), Ok(0));
}

#[test]
fn test_nothing_to_copy() {
    let src = gradient(4, 4, PixelFormat::Xrgb8888);
    let mut dst = Bitmap::new(4, 4, PixelFormat::Xrgb8888).unwrap();
    let before = dst.clone();
    assert_eq!(blit(&src, src.bounds(), &mut dst, Rect::at(4, 4)), None);
    assert_eq!(blit(&src, Rect::new(-10, 0, 5, 4), &mut dst, Rect::at(0, 0)), None);
    assert_eq!(dst, before);
}

#[test]
fn test_cross_format_copy_reencodes_every_pixel() {
    let src = gradient(5, 5, PixelFormat::Bgr24);
    for format in PixelFormat::ALL {
        let mut dst = Bitmap::new(5, 5, format).unwrap();
        blit(&src, src.bounds(), &mut dst, Rect::at(0, 0));
        for y in 0..5 {
            for x in 0..5 {
                let c = src.get_rgb(x, y).unwrap();
                assert_eq!(dst.get_pixel(x, y), Ok(pack(format, c.r, c.g, c.b)));
            }
        }
    }
}

#[test]
fn test_downscale_samples_nearest_source_pixels() {
    let src = gradient(8, 8, PixelFormat::Xrgb8888);
    let mut dst = Bitmap::new(4, 4, PixelFormat::Xrgb8888).unwrap();
    blit(&src, src.bounds(), &mut dst, Rect::new(0, 0, 4, 4));
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(dst.get_pixel(x, y), src.get_pixel(x * 2, y * 2));
        }
    }
}

#[test]
fn test_scaled_destination_is_clipped() {
    let mut src = Bitmap::new(1, 1, PixelFormat::Rgb565).unwrap();
    src.fill(0xF800);
    let mut dst = Bitmap::new(4, 4, PixelFormat::Rgb565).unwrap();
    let written = blit(&src, src.bounds(), &mut dst, Rect::new(2, 2, 8, 8));
    assert_eq!(written, Some(Rect::new(2, 2, 2, 2)));
    assert_eq!(dst.get_pixel(3, 3), Ok(0xF800));
    assert_eq!(dst.get_pixel(1, 1), Ok(0));
}

#[test]
fn test_color_key_is_transparent() {
    let mut src = Bitmap::new(3, 1, PixelFormat::Rgb565).unwrap();
    let key = src.pack(Rgb::MAGENTA);
    src.fill(key);
    src.put_rgb(1, 0, Rgb::GREEN);
    src.set_color_key(Some(key));

    let mut dst = Bitmap::new(3, 1, PixelFormat::Xrgb8888).unwrap();
    dst.fill(0x0000_0011);
    blit(&src, src.bounds(), &mut dst, Rect::at(0, 0));
    assert_eq!(dst.get_pixel(0, 0), Ok(0x0000_0011));
    assert_eq!(dst.get_rgb(1, 0), Ok(Rgb::new(0, 252, 0)));
    assert_eq!(dst.get_pixel(2, 0), Ok(0x0000_0011));
}

#[test]
fn test_saturating_ops_across_formats() {
    let mut src = Bitmap::new(1, 1, PixelFormat::Xrgb8888).unwrap();
    src.put_rgb(0, 0, Rgb::new(100, 100, 100));
    let mut dst = Bitmap::new(1, 1, PixelFormat::Bgr24).unwrap();
    dst.put_rgb(0, 0, Rgb::new(200, 50, 0));
    blit_with_op(&src, src.bounds(), &mut dst, Rect::at(0, 0), BlitOp::AddSaturate);
    assert_eq!(dst.get_rgb(0, 0), Ok(Rgb::new(255, 150, 100)));
    blit_with_op(&src, src.bounds(), &mut dst, Rect::at(0, 0), BlitOp::SubSaturate);
    assert_eq!(dst.get_rgb(0, 0), Ok(Rgb::new(155, 50, 0)));
}

#[test]
fn test_xor_twice_restores_destination() {
    let src = gradient(4, 4, PixelFormat::Rgb565);
    let mut dst = gradient(4, 4, PixelFormat::Rgb565);
    dst.put_rgb(1, 1, Rgb::WHITE);
    let before = dst.clone();
    blit_with_op(&src, src.bounds(), &mut dst, Rect::at(1, 0), BlitOp::Xor);
    assert_ne!(dst, before);
    blit_with_op(&src, src.bounds(), &mut dst, Rect::at(1, 0), BlitOp::Xor);
    assert_eq!(dst, before);
}

#[test]
fn test_overlapping_self_blit_matches_copy_through_temporary() {
    let original = gradient(8, 8, PixelFormat::Xrgb8888);
    let mut expected = original.clone();
    blit(&original, Rect::new(0, 0, 6, 6), &mut expected, Rect::at(2, 1));

    let mut bmp = original.clone();
    assert_eq!(
        blit_within(&mut bmp, Rect::new(0, 0, 6, 6), Rect::at(2, 1), BlitOp::Copy),
        Ok(Some(Rect::new(2, 1, 6, 6)))
    );
    assert_eq!(bmp, expected);
}
