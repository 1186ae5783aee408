//! QR badge for the download page: the release URL as a styled QR code on a
//! white canvas with a title and a call to action underneath.
//!
//! Module shapes and colours go through two hooks, [`ModuleDrawer`] and
//! [`ColorMask`]. When a styled render fails the plain square/solid render is
//! used instead, and when the caption cannot be laid out a bare plain QR is
//! written in place of the badge.
//!
//! Modules are drawn at a whole number of pixels each, sized so the symbol
//! fits [`QR_SIZE`], and padded with white instead of being resampled.

use crate::brand::{QR_BLUE, QR_DARK_BLUE, QR_FILE, QR_SUBTITLE_GREY};
use crate::canvas::save_png;
use crate::error::AssetError;
use crate::text::Typeface;
use crate::Options;
use anyhow::{Context, Result};
use image::{imageops::FilterType, DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba};
use qrcode::{Color, EcLevel, QrCode};
use std::path::PathBuf;

/// Quiet zone, in modules.
pub const BORDER: u32 = 4;
/// Edge length of the QR code on the badge.
pub const QR_SIZE: u32 = 400;
pub const CANVAS_SIZE: u32 = 500;
const TITLE_PX: f32 = 24.0;
const SUBTITLE_PX: f32 = 16.0;
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Which rendering path produced the saved file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrOutcome {
    /// Styled modules on the full badge.
    Styled,
    /// Plain modules on the full badge, after the styled render failed.
    Plain,
    /// Plain QR code only, after the caption could not be laid out.
    Bare,
}

/// Dark modules of an encoded symbol, without the quiet zone.
#[derive(Debug, Clone)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encode `data` at error-correction level H in the smallest version that fits.
    pub fn encode(data: &str) -> Result<Self, AssetError> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)?;
        Ok(Self::from_code(&code))
    }

    pub fn from_code(code: &QrCode) -> Self {
        Self {
            width: code.width(),
            dark: code.to_colors().into_iter().map(|c| c == Color::Dark).collect(),
        }
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at (`x`, `y`) is dark; anything outside the symbol is light.
    pub fn is_dark(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.width as i64 {
            return false;
        }
        self.dark[y as usize * self.width + x as usize]
    }

    /// Pixels per module so that the symbol and its quiet zone fit in [`QR_SIZE`].
    pub fn module_pitch(&self) -> u32 {
        (QR_SIZE / (self.width as u32 + 2 * BORDER)).max(1)
    }

    fn neighbours(&self, x: i64, y: i64) -> Neighbours {
        Neighbours {
            north: self.is_dark(x, y - 1),
            south: self.is_dark(x, y + 1),
            east: self.is_dark(x + 1, y),
            west: self.is_dark(x - 1, y),
        }
    }
}

/// Darkness of the four modules sharing an edge with the one being drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbours {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

/// Shapes one dark module into a coverage mask.
pub trait ModuleDrawer {
    /// Fill the `box_size` square at (`x0`, `y0`) of `mask`; 255 is full coverage.
    fn draw(
        &self,
        mask: &mut GrayImage,
        x0: u32,
        y0: u32,
        box_size: u32,
        neighbours: Neighbours,
    ) -> Result<(), AssetError>;
}

/// Colours the covered and uncovered parts of the symbol.
pub trait ColorMask {
    fn back_color(&self) -> Result<Rgb<u8>, AssetError>;

    /// Foreground colour at pixel (`x`, `y`) of a `width`×`height` image.
    fn fore_color(&self, x: u32, y: u32, width: u32, height: u32)
        -> Result<Rgb<u8>, AssetError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SquareModuleDrawer;

impl ModuleDrawer for SquareModuleDrawer {
    fn draw(
        &self,
        mask: &mut GrayImage,
        x0: u32,
        y0: u32,
        box_size: u32,
        _neighbours: Neighbours,
    ) -> Result<(), AssetError> {
        for y in y0..y0 + box_size {
            for x in x0..x0 + box_size {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        Ok(())
    }
}

/// Rounds every corner whose two adjacent sides border light modules, so
/// runs of dark modules stay joined and isolated ones become dots. Edges are
/// anti-aliased from a 4×4 grid of samples per pixel.
#[derive(Debug, Clone, Copy)]
pub struct RoundedModuleDrawer {
    /// Corner radius as a fraction of half the module, in `0.0..=1.0`.
    pub radius_ratio: f32,
}

impl Default for RoundedModuleDrawer {
    fn default() -> Self {
        Self { radius_ratio: 1.0 }
    }
}

impl ModuleDrawer for RoundedModuleDrawer {
    fn draw(
        &self,
        mask: &mut GrayImage,
        x0: u32,
        y0: u32,
        box_size: u32,
        n: Neighbours,
    ) -> Result<(), AssetError> {
        if !(0.0..=1.0).contains(&self.radius_ratio) {
            return Err(AssetError::Style(format!(
                "radius ratio {} outside 0..=1",
                self.radius_ratio
            )));
        }
        if box_size < 2 {
            return Err(AssetError::Style(format!(
                "module of {box_size}px is too small to round"
            )));
        }

        let size = box_size as f32;
        let radius = size / 2.0 * self.radius_ratio;
        let step = 1.0 / SUBSAMPLES as f32;

        for py in 0..box_size {
            for px in 0..box_size {
                let mut hits = 0;
                for sy in 0..SUBSAMPLES {
                    for sx in 0..SUBSAMPLES {
                        let x = px as f32 + (sx as f32 + 0.5) * step;
                        let y = py as f32 + (sy as f32 + 0.5) * step;
                        if covers(x, y, size, radius, n) {
                            hits += 1;
                        }
                    }
                }
                if hits > 0 {
                    let value = (hits * 255 / (SUBSAMPLES * SUBSAMPLES)) as u8;
                    let pixel = mask.get_pixel_mut(x0 + px, y0 + py);
                    pixel[0] = pixel[0].max(value);
                }
            }
        }
        Ok(())
    }
}

const SUBSAMPLES: u32 = 4;

/// Whether the point (`x`, `y`) of a `size` module lies inside its shape.
fn covers(x: f32, y: f32, size: f32, radius: f32, n: Neighbours) -> bool {
    let west = x < size / 2.0;
    let north = y < size / 2.0;

    let rounded = match (north, west) {
        (true, true) => !n.north && !n.west,
        (true, false) => !n.north && !n.east,
        (false, true) => !n.south && !n.west,
        (false, false) => !n.south && !n.east,
    };
    if !rounded {
        return true;
    }

    // distance from the corner, mirrored into the top-left quarter
    let lx = if west { x } else { size - x };
    let ly = if north { y } else { size - y };
    if lx >= radius || ly >= radius {
        return true;
    }
    let dx = lx - radius;
    let dy = ly - radius;
    dx * dx + dy * dy <= radius * radius
}

/// One foreground colour on one background colour.
#[derive(Debug, Clone, Copy)]
pub struct SolidFill {
    pub fore: Rgb<u8>,
    pub back: Rgb<u8>,
}

impl Default for SolidFill {
    fn default() -> Self {
        Self {
            fore: QR_BLUE,
            back: WHITE,
        }
    }
}

impl ColorMask for SolidFill {
    fn back_color(&self) -> Result<Rgb<u8>, AssetError> {
        Ok(self.back)
    }

    fn fore_color(
        &self,
        _x: u32,
        _y: u32,
        _width: u32,
        _height: u32,
    ) -> Result<Rgb<u8>, AssetError> {
        Ok(self.fore)
    }
}

/// Foreground blends from `center` in the middle of the image to `edge` at
/// its corners.
#[derive(Debug, Clone, Copy)]
pub struct RadialGradientColorMask {
    pub back: Rgb<u8>,
    pub center: Rgb<u8>,
    pub edge: Rgb<u8>,
}

impl Default for RadialGradientColorMask {
    fn default() -> Self {
        Self {
            back: WHITE,
            center: QR_BLUE,
            edge: QR_DARK_BLUE,
        }
    }
}

impl ColorMask for RadialGradientColorMask {
    fn back_color(&self) -> Result<Rgb<u8>, AssetError> {
        Ok(self.back)
    }

    fn fore_color(
        &self,
        x: u32,
        y: u32,
        width: u32,
        _height: u32,
    ) -> Result<Rgb<u8>, AssetError> {
        let half = width as f32 / 2.0;
        let dx = x as f32 - half;
        let dy = y as f32 - half;
        let distance = ((dx * dx + dy * dy).sqrt() / (std::f32::consts::SQRT_2 * half)).min(1.0);
        let mix = |c: usize| {
            (self.center[c] as f32 + (self.edge[c] as f32 - self.center[c] as f32) * distance)
                as u8
        };
        Ok(Rgb([mix(0), mix(1), mix(2)]))
    }
}

/// Rasterize `matrix` with a quiet zone, [`QrMatrix::module_pitch`] pixels per
/// module.
pub fn render_modules(
    matrix: &QrMatrix,
    drawer: &dyn ModuleDrawer,
    colors: &dyn ColorMask,
) -> Result<RgbImage, AssetError> {
    let modules = matrix.width() as u32;
    let pitch = matrix.module_pitch();
    let size = (modules + 2 * BORDER) * pitch;
    let mut coverage = GrayImage::new(size, size);

    for my in 0..modules {
        for mx in 0..modules {
            let (x, y) = (mx as i64, my as i64);
            if !matrix.is_dark(x, y) {
                continue;
            }
            drawer.draw(
                &mut coverage,
                (mx + BORDER) * pitch,
                (my + BORDER) * pitch,
                pitch,
                matrix.neighbours(x, y),
            )?;
        }
    }

    let back = colors.back_color()?;
    let mut img = RgbImage::from_pixel(size, size, back);
    for (x, y, cover) in coverage.enumerate_pixels() {
        if cover[0] == 0 {
            continue;
        }
        let fore = colors.fore_color(x, y, size, size)?;
        let t = cover[0] as f32 / 255.0;
        let mix = |c: usize| (back[c] as f32 * (1.0 - t) + fore[c] as f32 * t).round() as u8;
        img.put_pixel(x, y, Rgb([mix(0), mix(1), mix(2)]));
    }
    Ok(img)
}

/// Square modules in the brand blue on white.
pub fn render_plain(matrix: &QrMatrix) -> Result<RgbImage, AssetError> {
    render_modules(matrix, &SquareModuleDrawer, &SolidFill::default())
}

/// Centre `qr` on a white [`QR_SIZE`] square. Oversized symbols are scaled
/// down with nearest-neighbour sampling so module edges stay sharp.
pub fn pad_to_qr_size(qr: &RgbImage) -> RgbImage {
    if qr.width() > QR_SIZE || qr.height() > QR_SIZE {
        return image::imageops::resize(qr, QR_SIZE, QR_SIZE, FilterType::Nearest);
    }
    let mut square = RgbImage::from_pixel(QR_SIZE, QR_SIZE, WHITE);
    let x = ((QR_SIZE - qr.width()) / 2) as i64;
    let y = ((QR_SIZE - qr.height()) / 2) as i64;
    image::imageops::replace(&mut square, qr, x, y);
    square
}

/// Paste the QR code on the white canvas and write `title` and `subtitle`
/// centred under it. Empty lines are skipped.
///
/// Fails when a line renders no pixels or is wider than the canvas.
pub fn compose_badge(
    qr: &RgbImage,
    title: &str,
    subtitle: &str,
    typeface: &Typeface,
) -> Result<RgbImage, AssetError> {
    let qr = pad_to_qr_size(qr);
    let mut canvas = RgbImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, WHITE);

    let x = ((CANVAS_SIZE - QR_SIZE) / 2) as i64;
    let y = ((CANVAS_SIZE - QR_SIZE) / 2) as i64 - 20;
    image::imageops::replace(&mut canvas, &qr, x, y);

    let lines = [
        (title, TITLE_PX, QR_BLUE, CANVAS_SIZE - 60),
        (subtitle, SUBTITLE_PX, QR_SUBTITLE_GREY, CANVAS_SIZE - 35),
    ];
    for (text, px, color, top) in lines {
        if text.is_empty() {
            continue;
        }
        let mask = typeface.render(text, px);
        if mask.width() == 0 || mask.height() == 0 {
            return Err(AssetError::Layout(format!("{text:?} rendered no pixels")));
        }
        if mask.width() > CANVAS_SIZE {
            return Err(AssetError::Layout(format!(
                "{text:?} is {}px wide, the badge is {CANVAS_SIZE}px",
                mask.width()
            )));
        }
        let left = ((CANVAS_SIZE - mask.width()) / 2) as i64;
        mask.draw(
            &mut canvas,
            left,
            top as i64,
            Rgba([color[0], color[1], color[2], 255]),
        );
    }

    Ok(canvas)
}

/// Generate the QR badge with the default rounded, radial-gradient style.
pub fn generate_qr_badge(options: &Options) -> Result<(PathBuf, QrOutcome)> {
    generate_qr_badge_with(
        options,
        &RoundedModuleDrawer::default(),
        &RadialGradientColorMask::default(),
    )
}

/// Generate the QR badge with custom styling hooks.
///
/// Errors only when the payload cannot be encoded or the image cannot be
/// written.
pub fn generate_qr_badge_with(
    options: &Options,
    drawer: &dyn ModuleDrawer,
    colors: &dyn ColorMask,
) -> Result<(PathBuf, QrOutcome)> {
    println!("Generating {QR_FILE}...");
    let matrix = QrMatrix::encode(&options.url).context("Failed to encode download URL")?;
    let output_path = options.public.join(QR_FILE);

    let (qr_img, outcome) = match render_modules(&matrix, drawer, colors) {
        Ok(img) => (img, QrOutcome::Styled),
        Err(err) => {
            log::warn!("Styled QR code failed, falling back to plain modules: {err}");
            (render_plain(&matrix)?, QrOutcome::Plain)
        }
    };

    let typeface = options.fonts.resolve();
    let composed = compose_badge(&qr_img, &options.title, &options.subtitle, &typeface);
    let (img, outcome) = match composed {
        Ok(badge) => (badge, outcome),
        Err(err) => {
            log::warn!("Could not compose QR badge, writing a plain QR code: {err}");
            (pad_to_qr_size(&render_plain(&matrix)?), QrOutcome::Bare)
        }
    };

    let (width, height) = img.dimensions();
    save_png(&DynamicImage::ImageRgb8(img), &output_path)
        .with_context(|| format!("Failed to save QR code to {}", output_path.display()))?;

    println!("✓ Generated {} ({width}x{height})", output_path.display());
    println!("  URL: {}", options.url);
    Ok((output_path, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODULE: u32 = 10;

    fn lone_module() -> GrayImage {
        let mut mask = GrayImage::new(MODULE, MODULE);
        RoundedModuleDrawer::default()
            .draw(&mut mask, 0, 0, MODULE, Neighbours::default())
            .unwrap();
        mask
    }

    #[test]
    fn isolated_module_is_a_dot() {
        let mask = lone_module();
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(MODULE - 1, MODULE - 1)[0], 0);
        assert_eq!(mask.get_pixel(MODULE / 2, MODULE / 2)[0], 255);
        assert_eq!(mask.get_pixel(0, MODULE / 2)[0], 255);
    }

    #[test]
    fn joined_sides_keep_square_corners() {
        let mut mask = GrayImage::new(MODULE, MODULE);
        let n = Neighbours {
            north: true,
            west: true,
            ..Neighbours::default()
        };
        RoundedModuleDrawer::default()
            .draw(&mut mask, 0, 0, MODULE, n)
            .unwrap();
        assert_eq!(mask.get_pixel(0, 0)[0], 255);
        assert_eq!(mask.get_pixel(MODULE - 1, MODULE - 1)[0], 0);
    }

    #[test]
    fn invalid_radius_is_a_style_error() {
        let mut mask = GrayImage::new(MODULE, MODULE);
        let drawer = RoundedModuleDrawer { radius_ratio: 1.5 };
        let err = drawer
            .draw(&mut mask, 0, 0, MODULE, Neighbours::default())
            .unwrap_err();
        assert!(matches!(err, AssetError::Style(_)));
    }

    #[test]
    fn radial_mask_goes_from_centre_to_corner() {
        let mask = RadialGradientColorMask::default();
        assert_eq!(mask.fore_color(50, 50, 100, 100).unwrap(), QR_BLUE);
        assert_eq!(mask.fore_color(0, 0, 100, 100).unwrap(), QR_DARK_BLUE);
    }

    #[test]
    fn rounded_edges_are_anti_aliased() {
        let mask = lone_module();
        let partial = mask.pixels().filter(|p| p[0] > 0 && p[0] < 255).count();
        assert!(partial > 0, "dot edge should have partial coverage");
    }

    #[test]
    fn render_has_quiet_zone() {
        let matrix = QrMatrix::encode("hello").unwrap();
        let img = render_plain(&matrix).unwrap();
        let pitch = matrix.module_pitch();
        let expected = (matrix.width() as u32 + 2 * BORDER) * pitch;
        assert_eq!(img.dimensions(), (expected, expected));
        assert_eq!(*img.get_pixel(BORDER * pitch - 1, BORDER * pitch - 1), WHITE);
        // top-left finder pattern corner
        assert_eq!(*img.get_pixel(BORDER * pitch, BORDER * pitch), QR_BLUE);
    }

    #[test]
    fn download_url_gets_whole_pixel_modules() {
        let matrix = QrMatrix::encode(crate::brand::DOWNLOAD_URL).unwrap();
        // version 9 plus the quiet zone is 61 modules
        assert_eq!(matrix.width(), 53);
        assert_eq!(matrix.module_pitch(), 6);

        let padded = pad_to_qr_size(&render_plain(&matrix).unwrap());
        assert_eq!(padded.dimensions(), (QR_SIZE, QR_SIZE));
        // (400 - 366) / 2 white columns on the left
        assert_eq!(*padded.get_pixel(16, 200), WHITE);
    }

    #[test]
    fn outside_matrix_is_light() {
        let matrix = QrMatrix::encode("hello").unwrap();
        assert!(!matrix.is_dark(-1, 0));
        assert!(!matrix.is_dark(0, matrix.width() as i64));
        assert!(matrix.is_dark(0, 0));
    }
}
