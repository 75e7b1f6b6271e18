//! Pixel format codec through the public API.

use pixelflow_raster::color::{self, unpack_expanded, PixelFormat};
use pixelflow_raster::{pack, unpack, RasterError, Rgb};
use test_log::test;

#[test]
fn test_rgb565_truncates_and_restores_high_bits() {
    assert_eq!(pack(PixelFormat::Rgb565, 255, 0, 0), 0xF800);
    assert_eq!(unpack(PixelFormat::Rgb565, 0xF800), (248, 0, 0));
    assert_eq!(unpack_expanded(PixelFormat::Rgb565, 0xF800), (255, 0, 0));
}

#[test]
fn test_xrgb8888_is_lossless() {
    for (r, g, b) in [(0, 0, 0), (1, 2, 3), (255, 128, 7), (255, 255, 255)] {
        let packed = pack(PixelFormat::Xrgb8888, r, g, b);
        assert_eq!(packed >> 24, 0);
        assert_eq!(unpack(PixelFormat::Xrgb8888, packed), (r, g, b));
    }
}

#[test]
fn test_round_trip_error_is_bounded_by_channel_width() {
    for format in PixelFormat::ALL {
        let d = format.descriptor();
        let bound = |bits: u8| 1i32 << (8 - bits);
        for v in 0..=255u8 {
            let (r, g, b) = unpack(format, pack(format, v, v, v));
            assert!((v as i32 - r as i32).abs() < bound(d.red.bits), "{:?} red {}", format, v);
            assert!((v as i32 - g as i32).abs() < bound(d.green.bits), "{:?} green {}", format, v);
            assert!((v as i32 - b as i32).abs() < bound(d.blue.bits), "{:?} blue {}", format, v);
        }
    }
}

#[test]
fn test_bytes_per_pixel() {
    assert_eq!(color::bytes_per_pixel(PixelFormat::Rgb565), 2);
    assert_eq!(color::bytes_per_pixel(PixelFormat::Xrgb1555), 2);
    assert_eq!(color::bytes_per_pixel(PixelFormat::Bgr24), 3);
    assert_eq!(color::bytes_per_pixel(PixelFormat::Xrgb8888), 4);
}

#[test]
fn test_format_ids_round_trip() {
    for format in PixelFormat::ALL {
        assert_eq!(PixelFormat::from_id(format.id()), Ok(format));
        assert_eq!(PixelFormat::try_from(format.id()), Ok(format));
    }
    assert_eq!(PixelFormat::from_id(0xDEAD), Err(RasterError::InvalidFormat(0xDEAD)));
}

#[test]
fn test_bgr24_byte_order() {
    let mut bytes = [0u8; 3];
    color::write_packed(PixelFormat::Bgr24, &mut bytes, pack(PixelFormat::Bgr24, 0x11, 0x22, 0x33));
    assert_eq!(bytes, [0x33, 0x22, 0x11]);
    assert_eq!(
        unpack(PixelFormat::Bgr24, color::read_packed(PixelFormat::Bgr24, &bytes)),
        (0x11, 0x22, 0x33)
    );
}

#[test]
fn test_rgb_methods_match_free_functions() {
    let c = Rgb::new(200, 100, 50);
    for format in PixelFormat::ALL {
        assert_eq!(format.pack(c), pack(format, 200, 100, 50));
        assert_eq!(format.unpack(format.pack(c)), Rgb::from(unpack(format, format.pack(c))));
    }
}
