//! Raster primitives shared by the badge and QR renderers.

use anyhow::{Context, Result};
use image::{
    codecs::{
        ico::{IcoEncoder, IcoFrame},
        png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    },
    ColorType, DynamicImage, ImageBuffer, ImageEncoder, Pixel, Rgba, RgbaImage,
};
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::Path,
};

/// Whether the pixel (`x`, `y`) lies within a circle of `radius` around
/// (`cx`, `cy`), sampling at pixel centres.
fn inside(x: u32, y: u32, cx: f32, cy: f32, radius: f32) -> bool {
    let dx = x as f32 - cx;
    let dy = y as f32 - cy;
    dx * dx + dy * dy <= (radius + 0.5) * (radius + 0.5)
}

/// Fill a disc of `radius` around (`cx`, `cy`), replacing the pixels it covers.
pub fn fill_circle(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    if radius < 0.0 {
        return;
    }
    let (x0, y0, x1, y1) = clip_box(img, cx, cy, radius + 1.0);
    for y in y0..y1 {
        for x in x0..x1 {
            if inside(x, y, cx, cy, radius) {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Draw a ring `width` pixels wide whose outer edge is `outer_radius`.
pub fn stroke_circle(
    img: &mut RgbaImage,
    cx: f32,
    cy: f32,
    outer_radius: f32,
    width: u32,
    color: Rgba<u8>,
) {
    if width == 0 {
        return;
    }
    let inner_radius = outer_radius - width as f32;
    let (x0, y0, x1, y1) = clip_box(img, cx, cy, outer_radius + 1.0);
    for y in y0..y1 {
        for x in x0..x1 {
            if inside(x, y, cx, cy, outer_radius) && !inside(x, y, cx, cy, inner_radius) {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn clip_box(img: &RgbaImage, cx: f32, cy: f32, reach: f32) -> (u32, u32, u32, u32) {
    let clamp = |v: f32, max: u32| v.max(0.0).min(max as f32) as u32;
    (
        clamp((cx - reach).floor(), img.width()),
        clamp((cy - reach).floor(), img.height()),
        clamp((cx + reach).ceil() + 1.0, img.width()),
        clamp((cy + reach).ceil() + 1.0, img.height()),
    )
}

/// Source-over blend `color` onto the pixel at (`x`, `y`), scaling its alpha by
/// `coverage` (0..=255). Works for RGB and RGBA buffers; coordinates outside
/// the image are ignored.
pub fn blend_pixel<P>(
    img: &mut ImageBuffer<P, Vec<u8>>,
    x: i64,
    y: i64,
    color: Rgba<u8>,
    coverage: u8,
) where
    P: Pixel<Subpixel = u8>,
{
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 || coverage == 0 {
        return;
    }
    let src_a = color[3] as f32 * coverage as f32 / (255.0 * 255.0);
    let dst = img.get_pixel_mut(x as u32, y as u32).channels_mut();

    if dst.len() == 4 {
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let value = (color[c] as f32 * src_a + dst[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
            dst[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    } else {
        for c in 0..dst.len().min(3) {
            let value = color[c] as f32 * src_a + dst[c] as f32 * (1.0 - src_a);
            dst[c] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Save an image as PNG, creating the parent directory when needed.
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .with_context(|| format!("Can't create output directory {}", parent.display()))?;
    }

    let mut file = BufWriter::new(
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    image
        .write_to(&mut file, image::ImageOutputFormat::Png)
        .context("Failed to write PNG")?;
    file.flush()?;
    Ok(())
}

/// Pack square RGBA images into one ICO file, one PNG-encoded frame per image.
pub fn save_ico(images: &[RgbaImage], path: &Path) -> Result<()> {
    let mut frames = Vec::with_capacity(images.len());
    for image in images {
        let mut buf = Vec::new();
        write_png(image.as_raw(), &mut buf, image.width())?;
        frames.push(
            IcoFrame::with_encoded(buf, image.width(), image.height(), ColorType::Rgba8)
                .with_context(|| format!("Can't build {}px ICO frame", image.width()))?,
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).context("Can't create output directory")?;
    }
    let mut out_file = BufWriter::new(
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    let encoder = IcoEncoder::new(&mut out_file);
    encoder.encode_images(&frames)?;
    out_file.flush()?;
    Ok(())
}

// Encode image data as PNG with compression
fn write_png<W: Write>(image_data: &[u8], w: W, size: u32) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive);
    encoder.write_image(image_data, size, size, ColorType::Rgba8)?;
    Ok(())
}
