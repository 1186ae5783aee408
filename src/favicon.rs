use crate::badge::{render_badge, BadgeCenter, BadgeSpec};
use crate::brand::{favicon_png_file, FAVICON_96_FILE, FAVICON_ICO_FILE, FAVICON_SIZES};
use crate::canvas::{save_ico, save_png};
use crate::Options;
use anyhow::{Context, Result};
use image::{DynamicImage, RgbaImage};
use std::path::PathBuf;

/// Render the 96×96 Gmail badge and save it as PNG.
pub fn generate_favicon_96(options: &Options) -> Result<PathBuf> {
    println!("Generating {FAVICON_96_FILE}...");
    let typeface = options.fonts.resolve();
    let spec = BadgeSpec::gmail_96();
    let (img, center) = render_badge(&spec, &options.palette, &options.logo, &typeface);

    let output_path = options.downloads.join(FAVICON_96_FILE);
    save_png(&DynamicImage::ImageRgba8(img), &output_path)
        .with_context(|| format!("Failed to save {}", output_path.display()))?;

    println!("✓ Generated {} ({}x{}, {})", output_path.display(), spec.size, spec.size, describe(center));
    Ok(output_path)
}

/// Render the badge at every favicon size, save each as PNG and pack them
/// into one ICO. Returns the ICO path.
pub fn generate_favicon_set(options: &Options) -> Result<PathBuf> {
    println!("Generating favicon set...");
    let typeface = options.fonts.resolve();

    let images: Vec<RgbaImage> = FAVICON_SIZES
        .iter()
        .map(|&size| {
            let spec = BadgeSpec::favicon(size);
            render_badge(&spec, &options.palette, &options.logo, &typeface).0
        })
        .collect();

    for (img, size) in images.iter().zip(FAVICON_SIZES) {
        let output_path = options.downloads.join(favicon_png_file(size));
        save_png(&DynamicImage::ImageRgba8(img.clone()), &output_path)
            .with_context(|| format!("Failed to save {}", output_path.display()))?;
        println!("  ✓ Generated {}", output_path.display());
    }

    let ico_path = options.downloads.join(FAVICON_ICO_FILE);
    save_ico(&images, &ico_path)
        .with_context(|| format!("Failed to save {}", ico_path.display()))?;

    let sizes = FAVICON_SIZES
        .iter()
        .map(|s| format!("{s}x{s}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("✓ Generated {} ({sizes})", ico_path.display());
    Ok(ico_path)
}

fn describe(center: BadgeCenter) -> &'static str {
    match center {
        BadgeCenter::Logo => "logo",
        BadgeCenter::Label => "text label",
    }
}
