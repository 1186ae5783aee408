//! Font resolution and text rasterization.
//!
//! Text is rendered into a tight coverage mask first, so callers can measure
//! it (the mask size is the text bounding box) before deciding where to draw.

use crate::canvas::blend_pixel;
use crate::glyphs::{self, GLYPH_HEIGHT, GLYPH_SPACING, GLYPH_WIDTH};
use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgba};
use rusttype::{point, Font, Scale};
use std::path::{Path, PathBuf};

/// A font the renderers can draw with.
pub enum Typeface {
    TrueType(Font<'static>),
    /// The built-in 5×7 bitmap font, scaled by whole pixels.
    Builtin,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::TrueType(_) => f.write_str("Typeface::TrueType"),
            Typeface::Builtin => f.write_str("Typeface::Builtin"),
        }
    }
}

/// Rendered text: one coverage byte per pixel of the text bounding box.
#[derive(Debug, Clone)]
pub struct TextMask {
    pub coverage: GrayImage,
}

impl TextMask {
    pub fn width(&self) -> u32 {
        self.coverage.width()
    }

    pub fn height(&self) -> u32 {
        self.coverage.height()
    }

    /// Blend the mask onto `img` with its top-left corner at (`x`, `y`).
    /// Pixels falling outside the image are clipped.
    pub fn draw<P>(&self, img: &mut ImageBuffer<P, Vec<u8>>, x: i64, y: i64, color: Rgba<u8>)
    where
        P: Pixel<Subpixel = u8>,
    {
        for (mx, my, coverage) in self.coverage.enumerate_pixels() {
            blend_pixel(img, x + mx as i64, y + my as i64, color, coverage[0]);
        }
    }
}

/// Ordered list of font files tried before the built-in font.
#[derive(Debug, Clone, Default)]
pub struct FontChain {
    candidates: Vec<PathBuf>,
}

impl FontChain {
    /// The requested font (if any) followed by common system fonts.
    pub fn new(preferred: Option<PathBuf>) -> Self {
        let mut candidates: Vec<PathBuf> = preferred.into_iter().collect();
        candidates.extend(system_font_candidates().iter().map(PathBuf::from));
        Self { candidates }
    }

    /// A chain that always resolves to the built-in font. Output rendered with
    /// it does not depend on the fonts installed on the machine.
    pub fn builtin_only() -> Self {
        Self::default()
    }

    /// Load the first usable font, falling back to the built-in one.
    pub fn resolve(&self) -> Typeface {
        for path in &self.candidates {
            match load_font(path) {
                Some(font) => {
                    log::debug!("Using font {}", path.display());
                    return Typeface::TrueType(font);
                }
                None => log::debug!("Font {} not usable", path.display()),
            }
        }
        if !self.candidates.is_empty() {
            log::info!("No system font found, using built-in bitmap font");
        }
        Typeface::Builtin
    }
}

fn load_font(path: &Path) -> Option<Font<'static>> {
    let data = std::fs::read(path).ok()?;
    Font::try_from_vec(data)
}

fn system_font_candidates() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &[
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/Arial.ttf",
            "/Library/Fonts/Arial.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            "C:\\Windows\\Fonts\\arial.ttf",
            "C:\\Windows\\Fonts\\segoeui.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        ]
    }
}

impl Typeface {
    /// Rasterize `text` at a nominal pixel size.
    pub fn render(&self, text: &str, px: f32) -> TextMask {
        match self {
            Typeface::TrueType(font) => render_truetype(font, text, px),
            Typeface::Builtin => render_builtin(text, builtin_scale(px), GLYPH_SPACING),
        }
    }

    /// Like [`Typeface::render`], but shrinks the text until it is at most
    /// `max_width` pixels wide. The built-in font drops the gap between glyphs
    /// before it drops a scale step. Text that does not fit even at the
    /// smallest size comes back at that size.
    pub fn render_fit(&self, text: &str, px: f32, max_width: u32) -> TextMask {
        let mask = self.render(text, px);
        if mask.width() <= max_width {
            return mask;
        }

        let fitted = match self {
            Typeface::TrueType(font) => (1..px.ceil() as u32)
                .rev()
                .map(|size| render_truetype(font, text, size as f32))
                .find(|m| m.width() <= max_width),
            Typeface::Builtin => (1..=builtin_scale(px))
                .rev()
                .flat_map(|scale| [(scale, GLYPH_SPACING), (scale, 0)])
                .map(|(scale, spacing)| render_builtin(text, scale, spacing))
                .find(|m| m.width() <= max_width),
        };
        fitted.unwrap_or_else(|| match self {
            Typeface::TrueType(font) => render_truetype(font, text, 1.0),
            Typeface::Builtin => render_builtin(text, 1, 0),
        })
    }
}

fn render_truetype(font: &Font<'_>, text: &str, px: f32) -> TextMask {
    let scale = Scale::uniform(px);
    let ascent = font.v_metrics(scale).ascent;
    let positioned: Vec<_> = font.layout(text, scale, point(0.0, ascent)).collect();

    let bounds = positioned
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .reduce(|a, b| rusttype::Rect {
            min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
            max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
        });

    let Some(bounds) = bounds else {
        return TextMask {
            coverage: GrayImage::new(0, 0),
        };
    };

    let width = (bounds.max.x - bounds.min.x) as u32;
    let height = (bounds.max.y - bounds.min.y) as u32;
    let mut coverage = GrayImage::new(width, height);

    for glyph in &positioned {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let x = (gx as i32 + bb.min.x - bounds.min.x) as u32;
                let y = (gy as i32 + bb.min.y - bounds.min.y) as u32;
                if x < width && y < height {
                    let value = (v * 255.0).round() as u8;
                    let pixel = coverage.get_pixel_mut(x, y);
                    pixel[0] = pixel[0].max(value);
                }
            });
        }
    }

    TextMask { coverage }
}

/// Whole-pixel scale of the built-in font for a nominal size.
fn builtin_scale(px: f32) -> u32 {
    ((px / GLYPH_HEIGHT as f32).floor() as u32).max(1)
}

fn render_builtin(text: &str, scale: u32, spacing: u32) -> TextMask {
    let count = text.chars().count() as u32;
    if count == 0 {
        return TextMask {
            coverage: GrayImage::new(0, 0),
        };
    }

    let advance = (GLYPH_WIDTH + spacing) * scale;
    let width = advance * count - spacing * scale;
    let height = GLYPH_HEIGHT * scale;

    let coverage = GrayImage::from_fn(width, height, |x, y| {
        let index = x / advance;
        let col = (x % advance) / scale;
        let row = y / scale;
        let set = text
            .chars()
            .nth(index as usize)
            .map_or(false, |c| glyphs::is_set(c, col, row));
        Luma([if set { 255 } else { 0 }])
    });

    TextMask { coverage }
}
