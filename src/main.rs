// src/main.rs

//! Demo frame for the raster core: draws, blits and shades one framebuffer,
//! then optionally writes its raw bytes to a file.

use anyhow::Context;
use log::info;

use pixelflow_raster::blit::{blit, blit_with_op, blit_within, BlitOp};
use pixelflow_raster::mask::{blit_mask, blit_mask_stretched, CoverageMask, MaskMode};
use pixelflow_raster::rasterizer::{
    draw_circle, draw_filled_circle, draw_line, draw_rectangle, draw_triangle,
};
use pixelflow_raster::shader::{self, apply_shader_parallel, apply_shader_region};
use pixelflow_raster::{Bitmap, PixelFormat, Point, Rect, Rgb, CONFIG};

/// FNV-1a over the buffer, for comparing runs.
fn checksum(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// A small checkerboard sprite with a magenta color key.
fn sprite(format: PixelFormat) -> anyhow::Result<Bitmap> {
    let mut sprite = Bitmap::new(16, 16, format).context("Failed to create sprite")?;
    let key = sprite.pack(Rgb::MAGENTA);
    sprite.fill(key);
    for y in 0..16 {
        for x in 0..16 {
            if (x / 4 + y / 4) % 2 == 0 {
                sprite.put_rgb(x, y, Rgb::YELLOW);
            }
        }
    }
    sprite.set_color_key(Some(key));
    Ok(sprite)
}

/// An anti-aliased ring, as coverage bytes.
fn ring_coverage(size: u32) -> Vec<u8> {
    let c = size as f32 / 2.0;
    let mut coverage = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let d = ((x as f32 + 0.5 - c).powi(2) + (y as f32 + 0.5 - c).powi(2)).sqrt();
            let edge = (c * 0.3 - (d - c * 0.65).abs()).clamp(0.0, 1.0);
            coverage.push((edge * 255.0).round() as u8);
        }
    }
    coverage
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let output = std::env::args_os().nth(1);
    let config = &*CONFIG;
    info!("Starting pixelflow-raster with {:?}", config);

    let format = config.bitmap.format;
    let mut frame = Bitmap::new(config.bitmap.width, config.bitmap.height, format)
        .context("Failed to create framebuffer")?;
    frame.set_clear_color(frame.pack(config.bitmap.clear_color));
    frame.clear();

    let (w, h) = (frame.width() as i32, frame.height() as i32);

    // Background: a radial vignette over the whole frame, shaded in parallel.
    let vignette = |color: &mut [f32; 3], frag: [f32; 2]| {
        let dx = frag[0] - 0.5;
        let dy = frag[1] - 0.5;
        let d = (dx * dx + dy * dy).sqrt();
        let v = 1.0 - shader::smoothstep(0.2, 0.75, d);
        *color = [0.1 * v, 0.2 * v, 0.35 * v];
        true
    };
    apply_shader_parallel(&mut frame, &vignette, config.shader.flags, config.render.options());

    // Geometry.
    let white = frame.pack(Rgb::WHITE);
    let red = frame.pack(Rgb::RED);
    let green = frame.pack(Rgb::GREEN);
    let cyan = frame.pack(Rgb::CYAN);
    draw_line(&mut frame, Point::new(0, 0), Point::new(w - 1, h - 1), white);
    draw_line(&mut frame, Point::new(w - 1, 0), Point::new(0, h - 1), white);
    draw_triangle(
        &mut frame,
        Point::new(w / 2, h / 8),
        Point::new(w / 8, h - h / 8),
        Point::new(w - w / 8, h - h / 8),
        green,
    );
    draw_filled_circle(&mut frame, w / 2, h / 2, h / 6, red);
    draw_circle(&mut frame, w / 2, h / 2, h / 4, cyan);
    let bounds = frame.bounds();
    draw_rectangle(&mut frame, bounds, white);

    // Sprites: keyed, scaled and XOR'd copies.
    let sprite = sprite(format)?;
    blit(&sprite, sprite.bounds(), &mut frame, Rect::at(8, 8));
    blit(&sprite, sprite.bounds(), &mut frame, Rect::new(w - 72, 8, 64, 32));
    blit_with_op(&sprite, sprite.bounds(), &mut frame, Rect::at(-8, h - 8), BlitOp::Xor);

    // Duplicate the top-left corner into the bottom-right, within the frame.
    blit_within(
        &mut frame,
        Rect::new(0, 0, 48, 48),
        Rect::at(w - 48, h - 48),
        BlitOp::Copy,
    )
    .context("Failed to stage self-blit")?;

    // Coverage masks: one ring at native size, then stretched copies.
    let ring = ring_coverage(12);
    let mask = CoverageMask::new(&ring, 12, 12).context("Failed to wrap coverage mask")?;
    let yellow = frame.pack(Rgb::YELLOW);
    let black = frame.pack(Rgb::BLACK);
    blit_mask(&mask, mask.bounds(), &mut frame, Point::new(w / 2 - 6, 4), yellow, black, MaskMode::Transparent);
    blit_mask_stretched(
        &mask,
        mask.bounds(),
        &mut frame,
        Rect::new(-12, h / 2 - 24, 48, 48),
        white,
        black,
        MaskMode::Transparent,
    );
    blit_mask_stretched(
        &mask,
        mask.bounds(),
        &mut frame,
        Rect::new(w - 40, h / 2 - 16, 32, 32),
        white,
        black,
        MaskMode::ReverseTransparent,
    );

    // Stripe overlay on one band.
    let stripes = |color: &mut [f32; 3], frag: [f32; 2]| {
        if shader::step(0.5, shader::fract(frag[0] * 8.0)) == 0.0 {
            return false;
        }
        for c in color.iter_mut() {
            *c = shader::mix(*c, 1.0, 0.25);
        }
        true
    };
    apply_shader_region(&mut frame, Rect::new(0, h / 2 - 4, w as u32, 8), &stripes, config.shader.flags);

    info!(
        "Rendered {}x{} {:?} frame, {} bytes, checksum {:016x}",
        frame.width(),
        frame.height(),
        frame.format(),
        frame.raw_data().len(),
        checksum(frame.raw_data())
    );

    if let Some(path) = output {
        std::fs::write(&path, frame.raw_data())
            .with_context(|| format!("Failed to write {}", path.to_string_lossy()))?;
        info!("Wrote raw framebuffer to {}", path.to_string_lossy());
    }

    Ok(())
}
