//! Circular gradient badge used for every favicon size.

use crate::brand::{Palette, BADGE_LABEL, SHADOW};
use crate::canvas::{fill_circle, stroke_circle};
use crate::error::AssetError;
use crate::text::{TextMask, Typeface};
use image::{imageops::FilterType, Rgba, RgbaImage};
use std::path::Path;

/// Geometry of one badge rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeSpec {
    pub size: u32,
    /// Gap between the image edge and the gradient disc.
    pub margin: u32,
    pub outline_width: u32,
    /// Logo edge length as a fraction of `size`.
    pub logo_ratio: f32,
    pub font_size: u32,
    pub shadow: bool,
}

impl BadgeSpec {
    /// The 96×96 Gmail sender badge.
    pub fn gmail_96() -> Self {
        let size = 96;
        Self {
            size,
            margin: 5,
            outline_width: 2,
            logo_ratio: 0.65,
            font_size: size / 5,
            shadow: true,
        }
    }

    /// One frame of the multi-size favicon.
    pub fn favicon(size: u32) -> Self {
        Self {
            size,
            margin: 2,
            outline_width: 1,
            logo_ratio: 0.7,
            font_size: (size / 6).max(8),
            shadow: size >= 32,
        }
    }

    /// Radius of the gradient disc.
    pub fn radius(&self) -> u32 {
        (self.size / 2).saturating_sub(self.margin)
    }

    pub fn logo_size(&self) -> u32 {
        (self.size as f32 * self.logo_ratio) as u32
    }
}

/// What ended up in the middle of the badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeCenter {
    Logo,
    Label,
}

/// Draw the gradient disc of radius `radius` centred in `img`.
///
/// Rings are filled from the outside in, so each smaller disc overwrites the
/// previous one: the rim keeps `palette.primary` and the centre approaches
/// `palette.secondary`.
pub fn draw_gradient_disc(img: &mut RgbaImage, radius: u32, palette: &Palette) {
    let center = (img.width() / 2) as f32;
    for i in 0..radius {
        let ratio = i as f32 / radius as f32;
        let mix = |c: usize| {
            (palette.primary[c] as f32 * (1.0 - ratio) + palette.secondary[c] as f32 * ratio) as u8
        };
        let color = Rgba([mix(0), mix(1), mix(2), 255]);
        fill_circle(img, center, center, (radius - i) as f32, color);
    }
}

/// Render a badge and report whether the logo or the text label was used.
pub fn render_badge(
    spec: &BadgeSpec,
    palette: &Palette,
    logo: &Path,
    typeface: &Typeface,
) -> (RgbaImage, BadgeCenter) {
    let size = spec.size;
    let mut img = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));

    let radius = spec.radius();
    draw_gradient_disc(&mut img, radius, palette);

    // The outline sits one pixel outside the disc.
    let center = (size / 2) as f32;
    stroke_circle(
        &mut img,
        center,
        center,
        (radius + 1) as f32,
        spec.outline_width,
        palette.outline,
    );

    if !logo.exists() {
        log::info!(
            "Logo {} not found for {size}x{size}, using text fallback",
            logo.display()
        );
        draw_label(&mut img, spec, palette.outline, typeface);
        return (img, BadgeCenter::Label);
    }

    match load_logo(logo, spec.logo_size()) {
        Ok(logo_img) => {
            let offset = ((size - logo_img.width()) / 2) as i64;
            image::imageops::overlay(&mut img, &logo_img, offset, offset);
            (img, BadgeCenter::Logo)
        }
        Err(err) => {
            log::warn!("Could not use logo for {size}x{size}: {err}");
            draw_label(&mut img, spec, palette.outline, typeface);
            (img, BadgeCenter::Label)
        }
    }
}

fn load_logo(path: &Path, logo_size: u32) -> Result<RgbaImage, AssetError> {
    let logo = image::open(path).map_err(|source| AssetError::Logo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(logo
        .resize_exact(logo_size, logo_size, FilterType::Lanczos3)
        .to_rgba8())
}

/// The label, shrunk to fit across the badge.
fn label_mask(spec: &BadgeSpec, typeface: &Typeface) -> TextMask {
    typeface.render_fit(BADGE_LABEL, spec.font_size as f32, spec.size)
}

/// Draw the label centred on its measured bounding box, with an optional
/// one-pixel drop shadow.
fn draw_label(img: &mut RgbaImage, spec: &BadgeSpec, color: Rgba<u8>, typeface: &Typeface) {
    let mask = label_mask(spec, typeface);
    if mask.width() == 0 || mask.height() == 0 {
        log::warn!("Label rendered empty for {}x{}", spec.size, spec.size);
        return;
    }

    let x = (spec.size as i64 - mask.width() as i64).div_euclid(2);
    let y = (spec.size as i64 - mask.height() as i64).div_euclid(2);

    if spec.shadow {
        mask.draw(img, x + 1, y + 1, SHADOW);
    }
    mask.draw(img, x, y, color);
}
